//! HTML fetching with bounded retries, content-type gating, and pacing.
//!
//! # Architecture
//!
//! - [`HttpClient`]: the one-request seam, so tests can inject a fake origin
//! - [`ReqwestClient`]: the production client, configured once from [`HttpConfig`]
//! - [`Fetcher`]: retry loop around any [`HttpClient`]
//!
//! # Retry Strategy
//!
//! - Up to `max_retries` attempts per URL
//! - Non-success status: wait `retry_delay`, try again
//! - Transport failure: wait `network_backoff` (longer), try again
//! - Non-HTML content type: give up immediately, never retried
//! - Success: sleep `pacing` before returning
//!
//! Exhausting the attempts yields an empty page, which callers treat as
//! "skip this URL".

use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::HttpConfig;
use crate::error::FetchError;
use crate::models::{FetchResult, FetchStatus};

/// Content types accepted as parseable HTML.
const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// The parts of an HTTP response the fetcher looks at.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    /// Only populated for successful HTML responses.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    HTML_CONTENT_TYPES.iter().any(|t| lower.contains(t))
}

/// A single HTTP GET.
pub trait HttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Production [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let resp = self.inner.get(url).send().await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // Binary payloads are never downloaded.
        let body = if resp.status().is_success() && is_html_content_type(&content_type) {
            resp.text().await?
        } else {
            String::new()
        };

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Retrying, pacing fetcher over any [`HttpClient`].
pub struct Fetcher<C> {
    client: C,
    max_retries: usize,
    retry_delay: Duration,
    network_backoff: Duration,
    pacing: Duration,
}

impl<C> fmt::Debug for Fetcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("network_backoff", &self.network_backoff)
            .field("pacing", &self.pacing)
            .finish()
    }
}

impl Fetcher<ReqwestClient> {
    /// Build the production fetcher from the process-wide HTTP config.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        Ok(Self::new(ReqwestClient::new(config)?, config))
    }
}

impl<C> Fetcher<C>
where
    C: HttpClient,
{
    pub fn new(client: C, config: &HttpConfig) -> Self {
        Self {
            client,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            network_backoff: config.network_backoff(),
            pacing: config.pacing(),
        }
    }

    /// Fetch `url`, retrying transient failures.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page to fetch
    ///
    /// # Returns
    ///
    /// A [`FetchResult`] that never represents an error: a page that could not
    /// be fetched comes back with empty `html` and a non-`Ok` status. Successful
    /// fetches return only after the pacing sleep.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let t0 = Instant::now();
        let mut last_status = FetchStatus::NetworkError;

        for attempt in 1..=self.max_retries {
            match self.client.get(url).await {
                Ok(resp) if resp.is_success() => {
                    if !resp.is_html() {
                        warn!(content_type = %resp.content_type, "Skipping non-HTML content");
                        return FetchResult::failed(url, FetchStatus::SkippedNonHtml);
                    }
                    debug!(
                        attempt,
                        bytes = resp.body.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Fetched HTML"
                    );
                    if !self.pacing.is_zero() {
                        sleep(self.pacing).await;
                    }
                    return FetchResult::ok(url, resp.body);
                }
                Ok(resp) => {
                    last_status = FetchStatus::HttpError;
                    warn!(attempt, max = self.max_retries, status = resp.status, "Non-success status");
                    if attempt < self.max_retries {
                        sleep(self.retry_delay).await;
                    }
                }
                Err(e) => {
                    last_status = FetchStatus::NetworkError;
                    warn!(attempt, max = self.max_retries, error = %e, "Request failed; backing off");
                    if attempt < self.max_retries {
                        sleep(self.network_backoff).await;
                    }
                }
            }
        }

        info!(
            status = ?last_status,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Retries exhausted; skipping URL"
        );
        FetchResult::failed(url, last_status)
    }
}
