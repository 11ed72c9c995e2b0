//! Command-line interface definitions for the freelance parser.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Storage locations can be provided via command-line flags or environment
//! variables.

use crate::models::Site;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the freelance parser.
///
/// # Examples
///
/// ```sh
/// # Scrape five pages of FL.ru into ./data
/// freelance_parser fetch --site flru --pages 5
///
/// # Scrape both sites into a custom directory
/// FREELANCE_DATA_DIR=/srv/offers freelance_parser fetch --site all
///
/// # Show the newest stored offers mentioning "telegram"
/// freelance_parser list --query telegram --limit 50
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding offers.jsonl and offers.db
    #[arg(long, env = "FREELANCE_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Path of the SQLite database (defaults to <data-dir>/offers.db)
    #[arg(long, env = "FREELANCE_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Path of the JSON Lines log (defaults to <data-dir>/offers.jsonl)
    #[arg(long, env = "FREELANCE_JSONL_PATH", global = true)]
    pub jsonl_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch listings from a supported site and save them to storage
    Fetch(FetchArgs),
    /// Show the most recently scraped offers from the database
    List(ListArgs),
    /// Replay the JSON Lines log into the database
    Import,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Site to scrape
    #[arg(long, value_enum, ignore_case = true, default_value = "flru")]
    pub site: SiteChoice,

    /// Number of pages to fetch, starting from page 1
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Pause after each page, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// HTTP request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive substring to look for in titles
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of offers to read from the database
    #[arg(short, long, default_value_t = 1000)]
    pub limit: u32,

    /// Print one JSON object per line instead of a text listing
    #[arg(long)]
    pub json: bool,
}

/// Which site(s) `fetch` scrapes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteChoice {
    Flru,
    Kwork,
    /// FL.ru first, then Kwork
    All,
}

impl SiteChoice {
    pub fn sites(self) -> Vec<Site> {
        match self {
            SiteChoice::Flru => vec![Site::FlRu],
            SiteChoice::Kwork => vec![Site::Kwork],
            SiteChoice::All => vec![Site::FlRu, Site::Kwork],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_defaults() {
        let cli = Cli::parse_from(["freelance_parser", "fetch"]);

        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.site, SiteChoice::Flru);
        assert_eq!(args.pages, 5);
        assert_eq!(args.delay_ms, 1000);
        assert_eq!(args.timeout_secs, 10);
        assert!(cli.db_path.is_none());
    }

    #[test]
    fn test_cli_site_is_case_insensitive() {
        let cli = Cli::parse_from(["freelance_parser", "fetch", "--site", "KWORK", "--pages", "2"]);

        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.site, SiteChoice::Kwork);
        assert_eq!(args.pages, 2);
        assert_eq!(args.site.sites(), vec![Site::Kwork]);
    }

    #[test]
    fn test_cli_rejects_unknown_site_and_zero_pages() {
        assert!(Cli::try_parse_from(["freelance_parser", "fetch", "--site", "upwork"]).is_err());
        assert!(Cli::try_parse_from(["freelance_parser", "fetch", "--pages", "0"]).is_err());
    }

    #[test]
    fn test_cli_global_paths_after_subcommand() {
        let cli = Cli::parse_from([
            "freelance_parser",
            "list",
            "-q",
            "бот",
            "--db-path",
            "/tmp/offers.db",
            "--json",
        ]);

        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/offers.db")));
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.query.as_deref(), Some("бот"));
        assert_eq!(args.limit, 1000);
        assert!(args.json);
    }

    #[test]
    fn test_site_choice_all_order() {
        assert_eq!(SiteChoice::All.sites(), vec![Site::FlRu, Site::Kwork]);
    }
}
