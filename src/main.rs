//! # Freelance Parser
//!
//! Command-line entry point. Scrapes project listings from FL.ru and Kwork
//! and saves them to `data/offers.jsonl` and `data/offers.db`.
//!
//! ## Usage
//!
//! ```sh
//! freelance_parser fetch --site flru --pages 5
//! freelance_parser fetch --site all
//! freelance_parser list --query python
//! freelance_parser import
//! ```

use clap::Parser;
use freelance_parser::cli::{Cli, Command};
use freelance_parser::commands::{self, FetchOptions, format_offer_line};
use freelance_parser::scrapers::Origins;
use freelance_parser::storage::StoragePaths;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    let paths = StoragePaths::resolve(&args.data_dir, args.jsonl_path, args.db_path);
    debug!(?paths, "Resolved storage paths");

    match args.command {
        Command::Fetch(fetch) => {
            let opts = FetchOptions {
                sites: fetch.site.sites(),
                pages: fetch.pages,
                delay: Duration::from_millis(fetch.delay_ms),
                timeout: Duration::from_secs(fetch.timeout_secs),
                origins: Origins::default(),
            };
            info!(sites = ?opts.sites, pages = opts.pages, "Starting fetch");

            let summaries = commands::run_fetch(&paths, &opts).await.inspect_err(|e| {
                error!(error = %e, "Fetch failed");
            })?;
            for summary in summaries {
                println!(
                    "Saved offers from {} pages=1..{} (scraped {}, new {}, already stored {})",
                    summary.site,
                    summary.pages,
                    summary.scraped,
                    summary.stored.inserted,
                    summary.stored.ignored
                );
            }
        }
        Command::List(list) => {
            let offers = commands::run_list(&paths, list.query.as_deref(), list.limit).await?;
            for offer in &offers {
                if list.json {
                    println!("{}", serde_json::to_string(offer)?);
                } else {
                    println!("{}", format_offer_line(offer));
                }
            }
        }
        Command::Import => {
            let report = commands::run_import(&paths).await?;
            println!(
                "Imported {} offers from {} ({} already stored)",
                report.inserted,
                paths.jsonl.display(),
                report.ignored
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
