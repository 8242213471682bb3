//! Error types for the fetch, table, and pipeline layers.
//!
//! Per-URL and per-file failures are logged and skipped by the callers; only
//! [`PipelineError`] ever reaches `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to an origin server.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures reading or writing a tabular file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not decode {path} as UTF-8 or GB18030")]
    Undecodable { path: PathBuf },
}

/// Failures that end a stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No configured source produced any input for the stage.
    #[error("no input: {0}")]
    NoInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
}
