//! Export stage: social-media CSV exports → `weibo_raw.csv`.
//!
//! Every `*.csv` in the export directory is read (see [`crate::table::read_csv`]
//! for the encoding fallback), classified by [`crate::reconcile::reconcile`],
//! projected onto the export schema, and stacked in file-name order. A file
//! that cannot be read is logged and left out; the others still merge.

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::EXPORT_COLUMNS;
use crate::outputs::csv::write_csv;
use crate::reconcile::{ExportTags, project, reconcile};
use crate::table::{RawTable, read_csv};
use crate::utils::ensure_parent_dir;

/// `*.csv` files directly inside `dir`, sorted by name. Empty if `dir` is missing.
pub fn list_export_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Read every file, skipping any that fail.
pub fn load_exports(files: &[PathBuf]) -> Vec<RawTable> {
    files
        .iter()
        .filter_map(|path| match read_csv(path) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable export");
                None
            }
        })
        .collect()
}

/// Classify and project one export table. Each file is reconciled against
/// its own header, so duplicate-target overwrites never cross file boundaries.
pub fn reconcile_table(table: &RawTable, tags: &ExportTags) -> RawTable {
    let plan = reconcile(table.columns());
    project(table, &plan, tags)
}

/// Merge all exports into the reconciled export table.
///
/// Exports are optional: with no files (or none readable) the stage logs and
/// returns `Ok(None)` without writing anything.
#[instrument(level = "info", skip_all, fields(dir = %config.exports.dir.display()))]
pub async fn run_merge_exports(config: &PipelineConfig) -> Result<Option<usize>, PipelineError> {
    let files = list_export_files(&config.exports.dir);
    if files.is_empty() {
        info!("No export CSVs found; skipping");
        return Ok(None);
    }
    info!(files = files.len(), "Found export files");

    let tables = load_exports(&files);
    if tables.is_empty() {
        warn!("No readable export CSVs; skipping");
        return Ok(None);
    }

    let tags = ExportTags {
        country: config.exports.country.clone(),
        source: config.exports.source.clone(),
    };
    let merged = RawTable::concat(tables.iter().map(|t| reconcile_table(t, &tags)));

    let out = &config.paths.export_raw;
    ensure_parent_dir(out).await?;
    let rows = merged
        .rows()
        .iter()
        .map(|row| row.iter().map(|c| c.as_deref().unwrap_or_default()));
    let written = write_csv(out, &EXPORT_COLUMNS, rows)?;

    info!(path = %out.display(), rows = written, "Saved merged exports");
    Ok(Some(written))
}
