//! Pipeline configuration.
//!
//! Everything has a default, so the YAML file is optional. A minimal file
//! overriding only the URL lists looks like:
//!
//! ```yaml
//! url_lists:
//!   - file: config/cn_urls.txt
//!     country: CN
//!   - file: config/us_urls.txt
//!     country: US
//! http:
//!   pacing_ms: 1500
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::error::PipelineError;

/// Top-level configuration for every stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub http: HttpConfig,
    pub url_lists: Vec<UrlListConfig>,
    pub exports: ExportConfig,
    pub paths: PathsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            url_lists: vec![
                UrlListConfig {
                    file: PathBuf::from("config/cn_urls.txt"),
                    country: "CN".to_string(),
                },
                UrlListConfig {
                    file: PathBuf::from("config/us_urls.txt"),
                    country: "US".to_string(),
                },
            ],
            exports: ExportConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// HTTP client and retry settings, built once and handed to the fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    /// Wait after a non-success status before the next attempt.
    pub retry_delay_ms: u64,
    /// Wait after a transport failure before the next attempt.
    pub network_backoff_ms: u64,
    /// Courtesy sleep after every successful HTML fetch.
    pub pacing_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0 Safari/537.36"
                .to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            network_backoff_ms: 2000,
            pacing_ms: 1000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn network_backoff(&self) -> Duration {
        Duration::from_millis(self.network_backoff_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// One URL-list file and the country tag its records receive.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlListConfig {
    pub file: PathBuf,
    pub country: String,
}

/// Where social-media exports live and how their rows are tagged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub country: String,
    pub source: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("weibo_output"),
            country: "CN".to_string(),
            source: "weibo".to_string(),
        }
    }
}

/// Artifact locations, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub news_raw: PathBuf,
    pub export_raw: PathBuf,
    pub unified: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            news_raw: PathBuf::from("data/raw/news_raw.csv"),
            export_raw: PathBuf::from("data/raw/weibo_raw.csv"),
            unified: PathBuf::from("data/processed/all_texts.csv"),
        }
    }
}

impl PipelineConfig {
    /// Load from `path` if given, otherwise fall back to defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), lists = config.url_lists.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, PipelineError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Resolve every relative path in the config against `root`.
    pub fn rooted(mut self, root: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        for list in &mut self.url_lists {
            join(&mut list.file);
        }
        join(&mut self.exports.dir);
        join(&mut self.paths.news_raw);
        join(&mut self.paths.export_raw);
        join(&mut self.paths.unified);
        self
    }
}
