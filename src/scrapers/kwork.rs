//! Kwork project exchange fetcher.
//!
//! The Kwork frontend loads its project exchange from a JSON endpoint: the
//! page POSTs a form with the page number to `/projects` and receives
//! `{"data": {"wants": [...]}}`. Reading that endpoint is far more stable
//! than scraping the rendered markup.
//!
//! # Field Mapping
//!
//! | Want field | Offer field | Notes |
//! |------------|-------------|-------|
//! | `id` | `url` | `https://kwork.ru/projects/{id}` |
//! | `name` | `title` | Falls back to the first line of `description` |
//! | `description` | `description` | HTML stripped to plain text |
//! | `possiblePriceLimit` / `priceLimit` | `budget` | First non-empty wins |
//! | `date_create` | `posted_at` | Kept verbatim |

use crate::models::{Offer, Site};
use crate::utils::{first_line, html_to_text, non_empty, truncate_for_log};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Production origin of Kwork.
pub const BASE_URL: &str = "https://kwork.ru";

/// Longest title derived from a description, in characters.
const MAX_DERIVED_TITLE: usize = 200;

/// A project request ("want") as returned by the exchange endpoint.
///
/// Field names mirror the endpoint's JSON. Values whose type varies between
/// responses (numbers vs. strings) are kept as raw [`Value`]s.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct Want {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    possiblePriceLimit: Value,
    #[serde(default)]
    priceLimit: Value,
    #[serde(default)]
    date_create: Value,
}

/// Fetch and parse one page of the Kwork project exchange.
///
/// # Arguments
///
/// * `client` - Shared HTTP client (carries user agent and timeout)
/// * `base_url` - Site origin, normally [`BASE_URL`]
/// * `page` - 1-based page number, sent as the `page` form field
///
/// # Returns
///
/// The offers on the page, or an error if the request fails, the server
/// answers with a non-success status, or the body is not JSON.
#[instrument(level = "info", skip(client))]
pub async fn fetch_listing(
    client: &Client,
    base_url: &str,
    page: u32,
) -> Result<Vec<Offer>, Box<dyn Error>> {
    let endpoint = format!("{}/projects", base_url.trim_end_matches('/'));
    let page_field = page.to_string();

    let body = client
        .post(&endpoint)
        .form(&[("page", page_field.as_str())])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = body.len(), url = %endpoint, "Downloaded Kwork listing");

    let offers = parse_listing(&body, base_url)?;
    info!(count = offers.len(), page, "Parsed Kwork listing");
    Ok(offers)
}

/// Extract offers from a Kwork `/projects` JSON response.
///
/// A response without `data` or `data.wants` is an empty page. Wants that
/// cannot be decoded, or that lack an id or any usable title, are skipped.
pub fn parse_listing(body: &str, base_url: &str) -> Result<Vec<Offer>, Box<dyn Error>> {
    let root: Value = serde_json::from_str(body).map_err(|e| {
        format!(
            "Kwork response is not JSON ({e}): {}",
            truncate_for_log(body, 200)
        )
    })?;

    let wants = match root.get("data").and_then(|d| d.get("wants")) {
        Some(Value::Array(wants)) => wants,
        _ => {
            debug!("Kwork response has no data.wants");
            return Ok(Vec::new());
        }
    };

    let base = base_url.trim_end_matches('/');
    let mut offers = Vec::with_capacity(wants.len());
    for raw in wants {
        let want = match Want::deserialize(raw) {
            Ok(want) => want,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable Kwork want");
                continue;
            }
        };
        if let Some(offer) = want_to_offer(want, base) {
            offers.push(offer);
        }
    }
    Ok(offers)
}

fn want_to_offer(want: Want, base: &str) -> Option<Offer> {
    let id = scalar_text(&want.id)?;

    let raw_description = want.description.unwrap_or_default();
    let title = want
        .name
        .and_then(non_empty)
        .unwrap_or_else(|| first_line(&raw_description, MAX_DERIVED_TITLE));
    if title.trim().is_empty() {
        debug!(%id, "Skipping Kwork want without a title");
        return None;
    }

    let description = non_empty(html_to_text(&raw_description));
    let budget = scalar_text(&want.possiblePriceLimit).or_else(|| scalar_text(&want.priceLimit));
    let posted_at = scalar_text(&want.date_create);

    Some(
        Offer::new(Site::Kwork, title, format!("{}/projects/{}", base, id))
            .with_description(description)
            .with_budget(budget)
            .with_posted_at(posted_at),
    )
}

/// Render a JSON string or number as text. Null, booleans, zero and empty
/// strings count as absent, so a price of `true` is dropped rather than
/// rendered as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
