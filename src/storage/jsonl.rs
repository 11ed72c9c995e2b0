//! Append-only JSON Lines log of scraped offers.
//!
//! Each line is one compact JSON object; non-ASCII text (Cyrillic titles,
//! the ruble sign) is written as UTF-8, not `\u` escapes. The log is never
//! rewritten, only appended to.

use crate::models::Offer;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Append `offers` to the log at `path`, creating the file if needed.
///
/// The whole batch is serialized before the file is touched, so a
/// serialization failure leaves the log unchanged.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = offers.len()))]
pub async fn append_offers(path: &Path, offers: &[Offer]) -> Result<(), Box<dyn Error>> {
    if offers.is_empty() {
        debug!("Nothing to append");
        return Ok(());
    }

    let mut buf = String::new();
    for offer in offers {
        buf.push_str(&serde_json::to_string(offer)?);
        buf.push('\n');
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    info!("Appended offers to JSONL log");
    Ok(())
}

/// Read every offer back from the log.
///
/// A missing file is an empty log. Blank lines are ignored.
///
/// # Errors
///
/// Returns an error naming the line number if a line is not a valid offer.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_offers(path: &Path) -> Result<Vec<Offer>, Box<dyn Error>> {
    if !fs::try_exists(path).await? {
        debug!("JSONL log does not exist yet");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).await?;
    let mut offers = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let offer = serde_json::from_str::<Offer>(line)
            .map_err(|e| format!("{}:{}: invalid offer: {}", path.display(), idx + 1, e))?;
        offers.push(offer);
    }
    info!(count = offers.len(), "Read offers from JSONL log");
    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Site;

    #[tokio::test]
    async fn test_append_is_cumulative() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("offers.jsonl");

        let first = vec![Offer::new(Site::FlRu, "Дизайн логотипа", "https://www.fl.ru/projects/1/a.html")];
        let second = vec![
            Offer::new(Site::Kwork, "Парсер", "https://kwork.ru/projects/2")
                .with_budget(Some("1500".to_string())),
            Offer::new(Site::Kwork, "Верстка", "https://kwork.ru/projects/3"),
        ];

        append_offers(&path, &first).await.unwrap();
        append_offers(&path, &second).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.contains("Дизайн логотипа"));

        let back = read_offers(&path).await.unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back[0], first[0]);
        assert_eq!(back[1].budget.as_deref(), Some("1500"));
        assert_eq!(back[2].site, Site::Kwork);
    }

    #[tokio::test]
    async fn test_append_empty_batch_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("offers.jsonl");

        append_offers(&path, &[]).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let offers = read_offers(&tmp.path().join("nope.jsonl")).await.unwrap();
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn test_read_reports_bad_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("offers.jsonl");
        let good = serde_json::to_string(&Offer::new(Site::FlRu, "ok", "https://www.fl.ru/projects/1/a.html")).unwrap();
        std::fs::write(&path, format!("{good}\n\n{{\"title\": 1}}\n")).unwrap();

        let err = read_offers(&path).await.unwrap_err();
        assert!(err.to_string().contains(":3: invalid offer"));
    }
}
