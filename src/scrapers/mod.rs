//! Listing fetchers for the supported freelance sites.
//!
//! Each site module turns one page of its listing into normalized
//! [`Offer`](crate::models::Offer)s. The two sites use different transports:
//!
//! | Site | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | FL.ru | [`flru`] | HTML scraping | `GET /projects/?page=N`, cards parsed with CSS selectors |
//! | Kwork | [`kwork`] | JSON endpoint | `POST /projects` with form `page=N`, reads `data.wants` |
//!
//! # Common Patterns
//!
//! Each scraper module exports:
//! - `BASE_URL`: The production origin of the site
//! - `fetch_listing(client, base_url, page)`: Downloads and parses one page
//! - `parse_listing(body, base_url)`: Pure parsing, used by `fetch_listing` and tests
//!
//! Fetchers make a single request per page. Pagination, politeness delays
//! and persistence are the caller's concern.

pub mod flru;
pub mod kwork;

use crate::models::{Offer, Site};
use reqwest::Client;
use std::error::Error;
use std::time::Duration;

/// User agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; FreelanceParser/0.1; +https://example.com)";

/// Build the HTTP client shared by all fetchers.
pub fn http_client(timeout: Duration) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Where each site is served from.
///
/// Defaults to the production origins; tests point both at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origins {
    pub flru: String,
    pub kwork: String,
}

impl Default for Origins {
    fn default() -> Self {
        Self {
            flru: flru::BASE_URL.to_string(),
            kwork: kwork::BASE_URL.to_string(),
        }
    }
}

impl Origins {
    pub fn for_site(&self, site: Site) -> &str {
        match site {
            Site::FlRu => &self.flru,
            Site::Kwork => &self.kwork,
        }
    }
}

/// Fetch one listing page of `site`.
pub async fn fetch_listing(
    site: Site,
    client: &Client,
    origins: &Origins,
    page: u32,
) -> Result<Vec<Offer>, Box<dyn Error>> {
    let base_url = origins.for_site(site);
    match site {
        Site::FlRu => flru::fetch_listing(client, base_url, page).await,
        Site::Kwork => kwork::fetch_listing(client, base_url, page).await,
    }
}
