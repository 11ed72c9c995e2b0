//! Data models for scraped freelance offers.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Site`]: The closed set of listing sources
//! - [`Offer`]: A normalized project listing, identical for every source
//!
//! Every fetcher maps its site's markup or JSON onto [`Offer`], and both
//! storage sinks persist exactly this shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A freelance marketplace the application knows how to scrape.
///
/// The serialized form (`"fl.ru"`, `"kwork.ru"`) is what lands in the
/// `site` column and in the JSONL log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    /// FL.ru, scraped from its HTML project listing.
    #[serde(rename = "fl.ru")]
    FlRu,
    /// Kwork, read from the JSON endpoint behind its project exchange.
    #[serde(rename = "kwork.ru")]
    Kwork,
}

impl Site {
    /// The value stored in records, e.g. `"fl.ru"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::FlRu => "fl.ru",
            Site::Kwork => "kwork.ru",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fl.ru" => Ok(Site::FlRu),
            "kwork.ru" => Ok(Site::Kwork),
            other => Err(format!("unknown site: {other}")),
        }
    }
}

/// A single project listing, normalized across sites.
///
/// # Identity
///
/// `id` is derived from `url` (see [`offer_id`]), so one listing maps to
/// one id no matter how many times it is scraped. Both storage keys,
/// `id` and `url`, therefore identify the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Stable identifier derived from the listing URL.
    pub id: String,
    /// The site the listing was scraped from.
    pub site: Site,
    /// The project title.
    pub title: String,
    /// Absolute URL of the project page.
    pub url: String,
    /// Plain-text project description, if the listing shows one.
    pub description: Option<String>,
    /// Budget as the site displays it (free-form, not parsed).
    pub budget: Option<String>,
    /// Publication time as reported by the site, verbatim.
    pub posted_at: Option<String>,
    /// When this record was produced.
    pub scraped_at: DateTime<Utc>,
}

impl Offer {
    /// Build an offer with only the required fields set.
    ///
    /// The id is computed from `url` and `scraped_at` is the current time.
    pub fn new(site: Site, title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: offer_id(&url),
            site,
            title: title.into(),
            url,
            description: None,
            budget: None,
            posted_at: None,
            scraped_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_budget(mut self, budget: Option<String>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_posted_at(mut self, posted_at: Option<String>) -> Self {
        self.posted_at = posted_at;
        self
    }
}

/// Derive the record id for a listing URL.
///
/// A name-based (v5) UUID in the URL namespace, rendered hyphenated.
pub fn offer_id(url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_id_is_stable_per_url() {
        let a = offer_id("https://www.fl.ru/projects/5234567/test-project.html");
        let b = offer_id("https://www.fl.ru/projects/5234567/test-project.html");
        let c = offer_id("https://www.fl.ru/projects/5234568/other.html");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_offer_new_defaults() {
        let offer = Offer::new(Site::Kwork, "Landing page", "https://kwork.ru/projects/42");

        assert_eq!(offer.id, offer_id("https://kwork.ru/projects/42"));
        assert_eq!(offer.site, Site::Kwork);
        assert!(offer.description.is_none());
        assert!(offer.budget.is_none());
        assert!(offer.posted_at.is_none());
    }

    #[test]
    fn test_offer_serialization_uses_site_domain() {
        let offer = Offer::new(Site::FlRu, "Сайт на Tilda", "https://www.fl.ru/projects/1/x.html")
            .with_budget(Some("5 000 ₽".to_string()));

        let json = serde_json::to_string(&offer).unwrap();
        assert!(json.contains(r#""site":"fl.ru""#));
        assert!(json.contains(r#""budget":"5 000 ₽""#));
        assert!(json.contains(r#""description":null"#));

        let back: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, offer);
    }

    #[test]
    fn test_site_from_str() {
        assert_eq!("fl.ru".parse::<Site>().unwrap(), Site::FlRu);
        assert_eq!("kwork.ru".parse::<Site>().unwrap(), Site::Kwork);
        assert!("upwork.com".parse::<Site>().is_err());
        assert_eq!(Site::Kwork.to_string(), "kwork.ru");
    }
}
