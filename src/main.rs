//! # textmerge
//!
//! Builds one canonical text dataset out of two very different inputs:
//! news articles crawled from structurally inconsistent sites, and CSV
//! exports from a social-media collection tool whose column names are
//! anyone's guess.
//!
//! ## Usage
//!
//! ```sh
//! textmerge all
//! ```
//!
//! ## Architecture
//!
//! Three independent batch stages, each reading one artifact and writing the next:
//! 1. **crawl**: URL lists → fetch (retry, content-type gate, pacing) →
//!    per-site extraction → `data/raw/news_raw.csv`
//! 2. **merge-exports**: export CSVs → column classification →
//!    `data/raw/weibo_raw.csv`
//! 3. **build**: both raw tables → padding, backfill, admission filter →
//!    `data/processed/all_texts.csv`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawl;
mod dataset;
mod date;
mod error;
mod exports;
mod fetch;
mod models;
mod outputs;
mod reconcile;
mod scrapers;
mod table;
mod unify;
mod utils;

use cli::{Cli, Command};
use config::PipelineConfig;
use error::PipelineError;
use fetch::Fetcher;
use scrapers::Registry;

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
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = PipelineConfig::load(args.config.as_deref())?.rooted(&args.root);
    info!(root = %args.root.display(), command = ?args.command, "textmerge starting up");

    if let Err(e) = run(args.command, &config).await {
        error!(error = %e, "Stage failed");
        return Err(e.into());
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

#[instrument(level = "info", skip(config))]
async fn run(command: Command, config: &PipelineConfig) -> Result<(), PipelineError> {
    if matches!(command, Command::Crawl | Command::All) {
        let fetcher = Fetcher::from_config(&config.http)?;
        let registry = Registry::default();
        match crawl::run_crawl(config, &fetcher, &registry).await {
            // With `all`, exports alone may still feed the build.
            Err(PipelineError::NoInput(reason)) if command == Command::All => {
                warn!(%reason, "Crawl had no input; continuing with exports");
            }
            other => {
                other?;
            }
        }
    }

    if matches!(command, Command::MergeExports | Command::All) {
        exports::run_merge_exports(config).await?;
    }

    if matches!(command, Command::Build | Command::All) {
        dataset::run_build(config).await?;
    }

    Ok(())
}
