//! Persistence sinks for scraped offers.
//!
//! Every offer is written twice:
//!
//! - [`jsonl`]: An append-only JSON Lines log, one offer per line
//! - [`sqlite`]: An `offers` table with `INSERT OR IGNORE` on `id` and `url`
//!
//! # Layout
//!
//! ```text
//! data/
//! ├── offers.jsonl   # every offer produced, in scrape order
//! └── offers.db      # one row per listing
//! ```
//!
//! The log can be replayed into the table (see the `import` command), so the
//! table is always rebuildable from the log.

pub mod jsonl;
pub mod sqlite;

use itertools::Itertools;
use std::path::{Path, PathBuf};

/// Default file name of the JSON Lines log inside the data directory.
pub const JSONL_FILE: &str = "offers.jsonl";
/// Default file name of the SQLite database inside the data directory.
pub const SQLITE_FILE: &str = "offers.db";

/// Resolved locations of both sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub jsonl: PathBuf,
    pub sqlite: PathBuf,
}

impl StoragePaths {
    /// Place both files in `data_dir` unless an explicit path overrides them.
    pub fn resolve(data_dir: &Path, jsonl: Option<PathBuf>, sqlite: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            jsonl: jsonl.unwrap_or_else(|| data_dir.join(JSONL_FILE)),
            sqlite: sqlite.unwrap_or_else(|| data_dir.join(SQLITE_FILE)),
        }
    }

    /// Directories holding the two files, each listed once.
    ///
    /// A bare file name lives in the current directory.
    pub fn parent_dirs(&self) -> Vec<PathBuf> {
        [&self.jsonl, &self.sqlite]
            .into_iter()
            .map(|file| match file.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            })
            .unique()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let paths = StoragePaths::resolve(Path::new("data"), None, None);
        assert_eq!(paths.jsonl, PathBuf::from("data/offers.jsonl"));
        assert_eq!(paths.sqlite, PathBuf::from("data/offers.db"));
    }

    #[test]
    fn test_resolve_overrides() {
        let paths = StoragePaths::resolve(
            Path::new("data"),
            Some(PathBuf::from("/tmp/log.jsonl")),
            Some(PathBuf::from("/var/lib/offers.db")),
        );
        assert_eq!(paths.data_dir, PathBuf::from("data"));
        assert_eq!(paths.jsonl, PathBuf::from("/tmp/log.jsonl"));
        assert_eq!(paths.sqlite, PathBuf::from("/var/lib/offers.db"));
    }

    #[test]
    fn test_parent_dirs() {
        let paths = StoragePaths::resolve(Path::new("data"), None, None);
        assert_eq!(paths.parent_dirs(), vec![PathBuf::from("data")]);

        let paths = StoragePaths::resolve(
            Path::new("data"),
            Some(PathBuf::from("logs/offers.jsonl")),
            Some(PathBuf::from("offers.db")),
        );
        assert_eq!(
            paths.parent_dirs(),
            vec![PathBuf::from("logs"), PathBuf::from(".")]
        );
    }
}
