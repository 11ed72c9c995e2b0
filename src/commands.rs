//! The `fetch`, `list` and `import` commands.
//!
//! # Fetch Pipeline
//!
//! For each selected site, pages `1..=N` are processed one after another:
//! 1. **Fetching**: Download and parse one listing page
//! 2. **Deduplication**: Drop offers already produced earlier in this run
//! 3. **Output**: Append the batch to the JSONL log and insert it into SQLite
//! 4. **Pause**: Sleep the politeness delay before the next page
//!
//! A failed page aborts the run. Pages already processed stay persisted.

use crate::dedupe::Seen;
use crate::models::{Offer, Site};
use crate::scrapers::{self, Origins};
use crate::storage::sqlite::{InsertReport, OfferStore};
use crate::storage::{StoragePaths, jsonl};
use crate::utils::{ensure_writable_dir, truncate_for_log};
use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// Parameters of a `fetch` run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub sites: Vec<Site>,
    pub pages: u32,
    pub delay: Duration,
    pub timeout: Duration,
    pub origins: Origins,
}

/// Per-site totals of a `fetch` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteSummary {
    pub site: Site,
    pub pages: u32,
    /// Offers kept after in-run deduplication.
    pub scraped: usize,
    pub stored: InsertReport,
}

/// Scrape the selected sites and persist every page as it arrives.
#[instrument(level = "info", skip_all, fields(pages = opts.pages))]
pub async fn run_fetch(
    paths: &StoragePaths,
    opts: &FetchOptions,
) -> Result<Vec<SiteSummary>, Box<dyn Error>> {
    prepare_dirs(paths).await?;
    let client = scrapers::http_client(opts.timeout)?;
    let store = OfferStore::open(&paths.sqlite).await?;

    let result = fetch_sites(paths, opts, &client, &store).await;
    store.close().await;
    result
}

async fn fetch_sites(
    paths: &StoragePaths,
    opts: &FetchOptions,
    client: &Client,
    store: &OfferStore,
) -> Result<Vec<SiteSummary>, Box<dyn Error>> {
    let mut seen = Seen::new();
    let mut summaries = Vec::with_capacity(opts.sites.len());
    for &site in &opts.sites {
        let start_time = Instant::now();
        let mut summary = SiteSummary {
            site,
            pages: opts.pages,
            scraped: 0,
            stored: InsertReport::default(),
        };

        for page in 1..=opts.pages {
            let offers = scrapers::fetch_listing(site, client, &opts.origins, page)
                .await
                .inspect_err(|e| error!(%site, page, error = %e, "Fetching listing page failed"))?;

            let fetched = offers.len();
            let offers = seen.retain_new(offers);
            debug!(%site, page, fetched, new = offers.len(), "Deduplicated page");
            for offer in &offers {
                debug!(title = %truncate_for_log(&offer.title, 80), url = %offer.url, "Offer");
            }

            jsonl::append_offers(&paths.jsonl, &offers).await?;
            let report = store.insert_all(&offers).await?;
            summary.scraped += offers.len();
            summary.stored.add(report);

            if !opts.delay.is_zero() {
                sleep(opts.delay).await;
            }
        }

        info!(
            %site,
            pages = summary.pages,
            scraped = summary.scraped,
            inserted = summary.stored.inserted,
            ignored = summary.stored.ignored,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Finished site"
        );
        summaries.push(summary);
    }

    info!(unique_offers = seen.len(), "Fetch run complete");
    Ok(summaries)
}

/// Create the directories of both storage files.
async fn prepare_dirs(paths: &StoragePaths) -> Result<(), Box<dyn Error>> {
    for dir in paths.parent_dirs() {
        ensure_writable_dir(&dir).await?;
    }
    Ok(())
}

/// Read the newest stored offers, optionally keeping only titles that
/// contain `query` (case-insensitive).
///
/// The filter applies to the `limit` newest rows, not to the whole table.
#[instrument(level = "info", skip(paths))]
pub async fn run_list(
    paths: &StoragePaths,
    query: Option<&str>,
    limit: u32,
) -> Result<Vec<Offer>, Box<dyn Error>> {
    if !fs::try_exists(&paths.sqlite).await? {
        return Err(format!(
            "database not found at {}; run `fetch` first",
            paths.sqlite.display()
        )
        .into());
    }

    let store = OfferStore::open(&paths.sqlite).await?;
    let offers = store.recent(limit).await?;
    store.close().await;

    let offers = match query {
        Some(q) => filter_by_title(offers, q),
        None => offers,
    };
    info!(count = offers.len(), "Listed offers");
    Ok(offers)
}

/// Keep offers whose title contains `query`, ignoring case.
pub fn filter_by_title(offers: Vec<Offer>, query: &str) -> Vec<Offer> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return offers;
    }
    offers
        .into_iter()
        .filter(|o| o.title.to_lowercase().contains(&needle))
        .collect()
}

/// One line of the text listing: site, title, budget, posted time and url.
pub fn format_offer_line(offer: &Offer) -> String {
    format!(
        "{:<9} {} | {} | {} | {}",
        offer.site.as_str(),
        offer.title,
        offer.budget.as_deref().unwrap_or("-"),
        offer.posted_at.as_deref().unwrap_or("-"),
        offer.url
    )
}

/// Replay the JSONL log into the database.
#[instrument(level = "info", skip_all)]
pub async fn run_import(paths: &StoragePaths) -> Result<InsertReport, Box<dyn Error>> {
    let offers = jsonl::read_offers(&paths.jsonl).await?;
    prepare_dirs(paths).await?;
    let store = OfferStore::open(&paths.sqlite).await?;
    let report = store.insert_all(&offers).await;
    store.close().await;
    let report = report?;
    info!(
        read = offers.len(),
        inserted = report.inserted,
        ignored = report.ignored,
        "Imported JSONL log"
    );
    Ok(report)
}
