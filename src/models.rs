//! Data models shared by the crawl, reconcile, and unify stages.
//!
//! - [`Record`]: one crawled article, normalized to the canonical fields
//! - [`Extracted`]: the `{title, date, content}` triple a strategy produces
//! - [`FetchResult`] / [`FetchStatus`]: transient outcome of a single fetch
//! - [`CanonicalRow`]: one row of the unified dataset
//!
//! Every textual field defaults to an empty string; nothing is ever absent.

use std::fmt;

/// Columns of the crawl output (`news_raw.csv`), in file order.
pub const NEWS_COLUMNS: [&str; 6] = ["title", "date", "content", "source", "url", "country"];

/// Columns of the reconciled export output (`weibo_raw.csv`), in file order.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "country",
    "source",
    "source_type",
    "date",
    "user_name",
    "content",
];

/// Columns of the unified dataset (`all_texts.csv`), in file order.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "country",
    "source",
    "source_type",
    "date",
    "title",
    "content",
    "url",
];

/// Whether a row came from a news site or a social-media export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceType {
    #[default]
    News,
    Social,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::News => "news",
            SourceType::Social => "social",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{title, date, content}` triple produced by an extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    /// Free-form, unnormalized date text as found on the page.
    pub date: String,
    /// Paragraph text joined with single spaces. Empty when no body was found.
    pub content: String,
}

/// A crawled article normalized to the canonical fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub date: String,
    pub content: String,
    pub url: String,
    /// Site identifier for known sites, raw origin otherwise.
    pub source: String,
    pub source_type: SourceType,
    /// Country tag of the URL list the article came from, e.g. `CN`.
    pub country: String,
}

impl Record {
    pub fn from_extracted(extracted: Extracted, url: &str, source: &str) -> Self {
        Self {
            title: extracted.title,
            date: extracted.date,
            content: extracted.content,
            url: url.to_string(),
            source: source.to_string(),
            source_type: SourceType::News,
            country: String::new(),
        }
    }

    /// Tag the record with the country of its URL list.
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    /// Cells in [`NEWS_COLUMNS`] order.
    pub fn news_cells(&self) -> [&str; 6] {
        [
            &self.title,
            &self.date,
            &self.content,
            &self.source,
            &self.url,
            &self.country,
        ]
    }
}

/// How a single fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    /// The origin answered with a non-HTML content type; never retried.
    SkippedNonHtml,
    /// Retries exhausted on non-success HTTP statuses.
    HttpError,
    /// Retries exhausted on transport failures.
    NetworkError,
}

/// Transient result of fetching one URL. `html` is empty unless `status` is `Ok`.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub html: String,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn ok(url: &str, html: String) -> Self {
        Self {
            url: url.to_string(),
            html,
            status: FetchStatus::Ok,
        }
    }

    pub fn failed(url: &str, status: FetchStatus) -> Self {
        Self {
            url: url.to_string(),
            html: String::new(),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok && !self.html.is_empty()
    }
}

/// One row of the unified dataset, in [`CANONICAL_COLUMNS`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    pub country: String,
    pub source: String,
    pub source_type: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub url: String,
}
