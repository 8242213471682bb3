//! Per-site extraction strategies and the origin-keyed dispatcher.
//!
//! Every page goes through [`Registry::dispatch`], which turns `(url, html)`
//! into a [`Record`]. The URL's origin is matched against an ordered table of
//! site needles; the first hit picks a specialized strategy, and anything
//! unmatched falls through to [`generic::Generic`] with the raw origin as its
//! `source`, so unknown sites stay distinguishable downstream.
//!
//! # Supported Sites
//!
//! | Needle | Source | Module |
//! |--------|--------|--------|
//! | `people.com.cn` | `people` | [`people`] |
//! | `globaltimes.cn` | `globaltimes_cn` | [`globaltimes`] |
//! | `reuters.com` | `reuters` | [`reuters`] |
//! | `lite.cnn.com` | `cnn` | [`cnn`] |
//!
//! Specialized sites are plain [`SiteProfile`] values: ordered selector lists
//! for title, date, and body. Adding a site is a new profile plus one
//! [`SiteEntry`] row.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::date;
use crate::models::{Extracted, Record};
use crate::utils::clean_text;

pub mod cnn;
pub mod generic;
pub mod globaltimes;
pub mod people;
pub mod reuters;

/// Turns a parsed page into `{title, date, content}`.
pub trait ExtractionStrategy {
    fn extract(&self, document: &Html) -> Extracted;
}

/// Ordered candidate selectors for one site, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub title: &'static [&'static str],
    /// Site-specific date elements; the heuristic resolver runs when these miss.
    pub date: &'static [&'static str],
    /// Body containers; paragraphs inside the first match become `content`.
    pub body: &'static [&'static str],
}

impl ExtractionStrategy for SiteProfile {
    fn extract(&self, document: &Html) -> Extracted {
        let title = select_first(document, self.title)
            .map(|el| stripped_text(&el))
            .unwrap_or_default();

        let date = select_first(document, self.date)
            .map(|el| site_date(&el))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| date::resolve(document));

        let content = match select_first(document, self.body) {
            Some(body) => paragraph_text(body.select(&PARAGRAPH)),
            None => {
                debug!(candidates = ?self.body, "No body container found");
                String::new()
            }
        };

        Extracted { title, date, content }
    }
}

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct SiteEntry {
    /// Substring searched for in the URL origin.
    pub needle: &'static str,
    /// Value written to `Record::source` on a match.
    pub source: &'static str,
    pub strategy: &'static (dyn ExtractionStrategy + Sync),
}

impl std::fmt::Debug for SiteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteEntry")
            .field("needle", &self.needle)
            .field("source", &self.source)
            .finish()
    }
}

/// Ordered origin → strategy table with [`generic::Generic`] as the fallback.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<SiteEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(vec![
            SiteEntry {
                needle: "people.com.cn",
                source: "people",
                strategy: &people::PROFILE,
            },
            SiteEntry {
                needle: "globaltimes.cn",
                source: "globaltimes_cn",
                strategy: &globaltimes::PROFILE,
            },
            SiteEntry {
                needle: "reuters.com",
                source: "reuters",
                strategy: &reuters::PROFILE,
            },
            SiteEntry {
                needle: "lite.cnn.com",
                source: "cnn",
                strategy: &cnn::PROFILE,
            },
        ])
    }
}

impl Registry {
    pub fn new(entries: Vec<SiteEntry>) -> Self {
        Self { entries }
    }

    /// First entry whose needle occurs in `origin`, ignoring case.
    pub fn lookup(&self, origin: &str) -> Option<&SiteEntry> {
        if origin.is_empty() {
            return None;
        }
        let origin = origin.to_lowercase();
        self.entries.iter().find(|e| origin.contains(e.needle))
    }

    /// Extract a [`Record`] from a fetched page. `country` is left empty for
    /// the caller to fill in.
    #[instrument(level = "debug", skip(self, html))]
    pub fn dispatch(&self, url: &str, html: &str) -> Record {
        let origin = origin(url);
        let document = Html::parse_document(html);

        let (source, extracted) = match self.lookup(&origin) {
            Some(entry) => (entry.source.to_string(), entry.strategy.extract(&document)),
            None => {
                debug!(%origin, "No site strategy; using generic extraction");
                (origin.clone(), generic::Generic.extract(&document))
            }
        };

        debug!(
            %source,
            title_chars = extracted.title.chars().count(),
            content_chars = extracted.content.chars().count(),
            date = %extracted.date,
            "Extracted article"
        );
        Record::from_extracted(extracted, url, &source)
    }
}

/// Network location of `url` exactly as written: everything between `://`
/// and the first `/`, `?` or `#`, so userinfo, explicit ports, letter case
/// and non-ASCII hosts survive. Empty for URLs that do not parse.
pub fn origin(url: &str) -> String {
    if let Err(e) = Url::parse(url) {
        warn!(%url, error = %e, "Unparseable URL; origin is empty");
        return String::new();
    }
    let Some((_, rest)) = url.split_once("://") else {
        return String::new();
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    rest[..end].to_string()
}

pub(crate) static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// First element matched by the first selector in `candidates` that matches
/// anything. Unparseable selectors are skipped.
pub fn select_first<'a>(document: &'a Html, candidates: &[&str]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|css| match Selector::parse(css) {
        Ok(selector) => document.select(&selector).next(),
        Err(e) => {
            warn!(selector = css, error = %e, "Invalid selector");
            None
        }
    })
}

/// All text pieces of `element`, each trimmed, glued without separators.
pub fn stripped_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// All text pieces of `element` joined with single spaces, whitespace collapsed.
pub fn spaced_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Join the text of every paragraph, collapsing whitespace.
pub fn paragraph_text<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    let parts: Vec<String> = paragraphs
        .map(|p| spaced_text(&p))
        .filter(|t| !t.is_empty())
        .collect();
    clean_text(&parts.join(" "))
}

/// A site-specific date element: its text, else its `datetime` attribute.
fn site_date(element: &ElementRef<'_>) -> String {
    let text = stripped_text(element);
    if !text.is_empty() {
        return text;
    }
    element
        .value()
        .attr("datetime")
        .map(|dt| dt.trim().to_string())
        .unwrap_or_default()
}
