//! SQLite storage for scraped offers.
//!
//! One `offers` table keyed on `id`, with `url` unique as well. Inserts use
//! `INSERT OR IGNORE`, so storing a listing that is already present (under
//! either key) is a no-op and re-running a scrape is idempotent.
//!
//! `scraped_at` is stored as RFC 3339 text, which sorts lexically in time
//! order for the UTC timestamps this application produces. Rows written by
//! older tools as `YYYY-MM-DD HH:MM:SS[.ffffff]` are read back as UTC.

use crate::models::{Offer, Site};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Outcome of a batch insert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertReport {
    /// Rows written.
    pub inserted: usize,
    /// Offers skipped because their id or url was already stored.
    pub ignored: usize,
}

impl InsertReport {
    pub fn add(&mut self, other: InsertReport) {
        self.inserted += other.inserted;
        self.ignored += other.ignored;
    }
}

/// Handle on the `offers` database.
#[derive(Debug, Clone)]
pub struct OfferStore {
    pool: SqlitePool,
}

impl OfferStore {
    /// Open the database at `path`, creating the file and the table if
    /// they do not exist yet.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self, Box<dyn Error>> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Opened offers database");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), Box<dyn Error>> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS offers (
                id TEXT PRIMARY KEY,
                site TEXT,
                title TEXT,
                url TEXT UNIQUE,
                description TEXT,
                budget TEXT,
                posted_at TEXT,
                scraped_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store one offer. Returns `true` if a row was written, `false` if the
    /// id or url was already present.
    pub async fn insert(&self, offer: &Offer) -> Result<bool, Box<dyn Error>> {
        let result = insert_query(offer).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a batch of offers in a single transaction.
    #[instrument(level = "info", skip_all, fields(count = offers.len()))]
    pub async fn insert_all(&self, offers: &[Offer]) -> Result<InsertReport, Box<dyn Error>> {
        let mut report = InsertReport::default();
        let mut tx = self.pool.begin().await?;
        for offer in offers {
            let result = insert_query(offer).execute(&mut *tx).await?;
            if result.rows_affected() > 0 {
                report.inserted += 1;
            } else {
                debug!(url = %offer.url, "Offer already stored");
                report.ignored += 1;
            }
        }
        tx.commit().await?;
        info!(inserted = report.inserted, ignored = report.ignored, "Stored offers");
        Ok(report)
    }

    /// The `limit` most recently scraped offers, newest first.
    ///
    /// Rows that cannot be turned back into an [`Offer`] are logged and
    /// skipped.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Offer>, Box<dyn Error>> {
        let rows = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT id, site, title, url, description, budget, posted_at, scraped_at
            FROM offers
            ORDER BY scraped_at DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let offers: Vec<Offer> = rows
            .into_iter()
            .filter_map(|row| {
                row.into_offer()
                    .inspect_err(|e| warn!(error = %e, "Skipping unreadable offer row"))
                    .ok()
            })
            .collect();
        Ok(offers)
    }

    /// Number of stored offers.
    pub async fn count(&self) -> Result<u64, Box<dyn Error>> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM offers")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(n)?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Naive timestamp layout used by earlier writers of the same table.
const LEGACY_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f";

fn parse_scraped_at(ts: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(ts)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, LEGACY_TIMESTAMP).map(|t| t.and_utc()))
}

fn insert_query(offer: &Offer) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO offers (id, site, title, url, description, budget, posted_at, scraped_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(offer.id.as_str())
    .bind(offer.site.as_str())
    .bind(offer.title.as_str())
    .bind(offer.url.as_str())
    .bind(offer.description.as_deref())
    .bind(offer.budget.as_deref())
    .bind(offer.posted_at.as_deref())
    .bind(offer.scraped_at.to_rfc3339())
}

// Columns other than `id` are nullable in the schema.
#[derive(Debug, FromRow)]
struct OfferRow {
    id: String,
    site: Option<String>,
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    budget: Option<String>,
    posted_at: Option<String>,
    scraped_at: Option<String>,
}

impl OfferRow {
    fn into_offer(self) -> Result<Offer, Box<dyn Error>> {
        let site: Site = self
            .site
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| format!("offer {}: {}", self.id, e))?;

        let scraped_at = match self.scraped_at.as_deref() {
            Some(ts) => parse_scraped_at(ts)
                .map_err(|e| format!("offer {}: invalid scraped_at {:?}: {}", self.id, ts, e))?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };

        Ok(Offer {
            id: self.id,
            site,
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            description: self.description,
            budget: self.budget,
            posted_at: self.posted_at,
            scraped_at,
        })
    }
}
