//! # Freelance Parser
//!
//! Scrapes freelance project listings from FL.ru and Kwork, normalizes them
//! into a single [`Offer`](models::Offer) shape, and stores them in an
//! append-only JSON Lines log and a SQLite table.
//!
//! ## Architecture
//!
//! 1. **Fetching**: [`scrapers`] turn one listing page into offers
//! 2. **Deduplication**: [`dedupe`] drops offers already seen in the run
//! 3. **Storage**: [`storage`] appends to the log and inserts-or-ignores into SQLite
//!
//! [`commands`] wires these into the `fetch`, `list` and `import` commands.

pub mod cli;
pub mod commands;
pub mod dedupe;
pub mod models;
pub mod scrapers;
pub mod storage;
pub mod utils;
