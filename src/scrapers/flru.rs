//! FL.ru project listing scraper.
//!
//! FL.ru renders its project feed server-side, so a listing page is plain
//! HTML. Each project is a `b-post` card holding a title link, an optional
//! description block and an optional price block.
//!
//! # URL Pattern
//!
//! Listing pages live at `https://www.fl.ru/projects/?page=N`. Project links
//! are relative (`/projects/5234567/slug.html`) and are resolved against the
//! site origin. Links not shaped like `/projects/<digits>/` (filters,
//! categories, ads) are ignored.

use crate::dedupe::unique_by_id;
use crate::models::{Offer, Site};
use crate::utils::{non_empty, normalize_whitespace};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Production origin of FL.ru.
pub const BASE_URL: &str = "https://www.fl.ru";

// Class matches are substring matches, so nested card parts
// (`b-post__grid`, `b-post__body`, ...) are candidates too.
static CARD: Lazy<Selector> = Lazy::new(|| sel(r#"div[class*="b-post"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| sel(r#"h2[class*="b-post__title"]"#));
static LINK: Lazy<Selector> = Lazy::new(|| sel("a[href]"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| sel(r#"div[class*="b-post__txt text-5"]"#));
static PRICE: Lazy<Selector> = Lazy::new(|| sel(r#"div[class*="b-post__price"]"#));

static PROJECT_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/projects/\d+/").expect("valid project href regex"));

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid static selector")
}

/// Fetch and parse one page of the FL.ru project listing.
///
/// # Arguments
///
/// * `client` - Shared HTTP client (carries user agent and timeout)
/// * `base_url` - Site origin, normally [`BASE_URL`]
/// * `page` - 1-based page number
///
/// # Returns
///
/// The offers found on the page, deduplicated by id, or an error if the
/// request fails or the server answers with a non-success status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_listing(
    client: &Client,
    base_url: &str,
    page: u32,
) -> Result<Vec<Offer>, Box<dyn Error>> {
    let listing_url = format!("{}/projects/?page={}", base_url.trim_end_matches('/'), page);

    let html = client
        .get(&listing_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = html.len(), url = %listing_url, "Downloaded FL.ru listing");

    let offers = parse_listing(&html, base_url)?;
    info!(count = offers.len(), page, "Parsed FL.ru listing");
    Ok(offers)
}

/// Extract offers from a FL.ru listing page.
///
/// Cards without a title link, or whose link is not a project link, are
/// skipped. Duplicates produced by nested card elements are removed,
/// keeping the first occurrence.
pub fn parse_listing(html: &str, base_url: &str) -> Result<Vec<Offer>, Box<dyn Error>> {
    let base = Url::parse(base_url)?;
    let document = Html::parse_document(html);

    let offers = document
        .select(&CARD)
        .filter_map(|card| parse_card(card, &base))
        .collect::<Vec<_>>();

    Ok(unique_by_id(offers))
}

fn parse_card(card: ElementRef<'_>, base: &Url) -> Option<Offer> {
    let title_tag = card.select(&TITLE).next()?;
    let link = title_tag.select(&LINK).next()?;
    let href = link.value().attr("href")?;

    if !PROJECT_HREF.is_match(href) {
        return None;
    }

    let title = normalize_whitespace(&link.text().collect::<String>());
    if title.is_empty() {
        return None;
    }
    let url = base.join(href).ok()?;

    let description = card
        .select(&DESCRIPTION)
        .next()
        .map(|d| normalize_whitespace(&d.text().collect::<String>()))
        .and_then(non_empty);

    let budget = card
        .select(&PRICE)
        .next()
        .map(|p| {
            p.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .and_then(non_empty);

    Some(
        Offer::new(Site::FlRu, title, url.to_string())
            .with_description(description)
            .with_budget(budget),
    )
}
