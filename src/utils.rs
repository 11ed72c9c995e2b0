//! Utility functions for text cleanup and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization and line truncation for scraped text
//! - HTML fragment to plain-text conversion
//! - String truncation for logging
//! - File system validation for the data directory

use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace("  Test \n  project "), "Test project");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Return `None` for strings that are empty after trimming.
pub fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// First line of the trimmed text, cut to at most `max_chars` characters.
///
/// Counts characters, not bytes, so Cyrillic text is never split inside
/// a code point.
pub fn first_line(s: &str, max_chars: usize) -> String {
    s.trim()
        .split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .take(max_chars)
        .collect()
}

/// Convert an HTML fragment into plain text.
///
/// Entities are decoded by the parser. Each text node is trimmed, empty
/// nodes are dropped, and the rest are joined with newlines.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(html_to_text("<p>Hello &amp; bye</p><br>next"), "Hello & bye\nnext");
/// ```
pub fn html_to_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    html.root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// a count of the dropped characters appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Data directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Test \n\t project  "), "Test project");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
        assert_eq!(non_empty("  \n".to_string()), None);
    }

    #[test]
    fn test_first_line_counts_chars() {
        let text = "\n  Нужен сайт-визитка\nс формой обратной связи";
        assert_eq!(first_line(text, 200), "Нужен сайт-визитка");
        assert_eq!(first_line(text, 5), "Нужен");
        assert_eq!(first_line("", 10), "");
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>Hello &amp; bye</p><br>  next  "),
            "Hello & bye\nnext"
        );
        assert_eq!(html_to_text("plain"), "plain");
        assert_eq!(html_to_text("<br><br>"), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "ж".repeat(50);
        let result = truncate_for_log(&s, 10);
        assert!(result.starts_with(&"ж".repeat(10)));
        assert!(result.ends_with("…(+40 chars)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");

        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
