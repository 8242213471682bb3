//! Build stage: `news_raw.csv` + `weibo_raw.csv` → `all_texts.csv`.

use std::path::Path;
use tracing::{info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{CANONICAL_COLUMNS, SourceType};
use crate::outputs::csv::write_csv;
use crate::table::{RawTable, read_csv};
use crate::unify::unify;
use crate::utils::ensure_parent_dir;

/// Values given to columns a raw table does not have at all.
#[derive(Debug, Clone)]
pub struct SourceDefaults {
    pub country: String,
    pub source: String,
    pub source_type: SourceType,
}

impl SourceDefaults {
    pub fn news() -> Self {
        Self {
            country: "CN".to_string(),
            source: "news".to_string(),
            source_type: SourceType::News,
        }
    }

    pub fn export(config: &PipelineConfig) -> Self {
        Self {
            country: config.exports.country.clone(),
            source: config.exports.source.clone(),
            source_type: SourceType::Social,
        }
    }

    pub fn apply(&self, table: &mut RawTable) {
        table.ensure_column("country", Some(self.country.clone()));
        table.ensure_column("source", Some(self.source.clone()));
        table.ensure_column("source_type", Some(self.source_type.to_string()));
    }
}

/// Load one raw table and fill in its defaults. Missing or unreadable files
/// are logged and yield `None`.
fn load_raw(path: &Path, defaults: &SourceDefaults) -> Option<RawTable> {
    if !path.exists() {
        warn!(path = %path.display(), "Raw table not found; leaving it out");
        return None;
    }
    match read_csv(path) {
        Ok(mut table) => {
            defaults.apply(&mut table);
            Some(table)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Raw table unreadable; leaving it out");
            None
        }
    }
}

/// Unify the crawl and export tables and write the canonical dataset.
/// Fails with [`PipelineError::NoInput`] when neither raw table is available.
#[instrument(level = "info", skip_all)]
pub async fn run_build(config: &PipelineConfig) -> Result<usize, PipelineError> {
    let tables: Vec<RawTable> = [
        load_raw(&config.paths.news_raw, &SourceDefaults::news()),
        load_raw(&config.paths.export_raw, &SourceDefaults::export(config)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if tables.is_empty() {
        return Err(PipelineError::NoInput(
            "neither the crawl table nor the export table exists".to_string(),
        ));
    }

    let unified = unify(tables);
    if unified.is_empty() {
        warn!("No rows passed the admission filter; writing header only");
    }

    let out = &config.paths.unified;
    ensure_parent_dir(out).await?;
    let written = write_csv(out, &CANONICAL_COLUMNS, unified.records())?;
    info!(path = %out.display(), rows = written, "Saved unified dataset");
    Ok(written)
}
