//! Crawl stage: URL lists → fetched pages → records → `news_raw.csv`.
//!
//! Fetching is sequential: one request at a time, with the
//! fetcher's pacing delay after every successful page. Records come out in
//! URL-list order, lists in config order.

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::fetch::{Fetcher, HttpClient};
use crate::models::{FetchResult, FetchStatus, NEWS_COLUMNS, Record};
use crate::outputs::csv::write_csv;
use crate::scrapers::Registry;
use crate::utils::{ensure_parent_dir, truncate_for_log};

/// URLs from a list file: trimmed, blanks and `#` comments dropped,
/// duplicates removed keeping the first occurrence.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .unique()
        .map(str::to_string)
        .collect()
}

pub fn load_url_list(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_url_list(text.trim_start_matches('\u{feff}')))
}

/// Per-status fetch counts for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub urls: usize,
    pub fetched: usize,
    pub skipped_non_html: usize,
    pub http_errors: usize,
    pub network_errors: usize,
}

impl CrawlReport {
    fn record(&mut self, result: &FetchResult) {
        match result.status {
            FetchStatus::Ok if result.is_ok() => self.fetched += 1,
            // A 200 with an empty body counts as a failed fetch.
            FetchStatus::Ok | FetchStatus::HttpError => self.http_errors += 1,
            FetchStatus::SkippedNonHtml => self.skipped_non_html += 1,
            FetchStatus::NetworkError => self.network_errors += 1,
        }
    }

    pub fn merge(&mut self, other: &CrawlReport) {
        self.urls += other.urls;
        self.fetched += other.fetched;
        self.skipped_non_html += other.skipped_non_html;
        self.http_errors += other.http_errors;
        self.network_errors += other.network_errors;
    }

    pub fn skipped(&self) -> usize {
        self.skipped_non_html + self.http_errors + self.network_errors
    }
}

/// Fetch and extract every URL in order, tagging records with `country`.
/// URLs that could not be fetched are skipped.
#[instrument(level = "info", skip(fetcher, registry, urls), fields(urls = urls.len()))]
pub async fn crawl_urls<C: HttpClient>(
    fetcher: &Fetcher<C>,
    registry: &Registry,
    urls: &[String],
    country: &str,
) -> (Vec<Record>, CrawlReport) {
    let results: Vec<FetchResult> = stream::iter(urls)
        .then(|url| fetcher.fetch(url))
        .collect()
        .await;

    let mut report = CrawlReport {
        urls: urls.len(),
        ..CrawlReport::default()
    };
    let mut records = Vec::new();
    for result in &results {
        report.record(result);
        if !result.is_ok() {
            debug!(url = %result.url, status = ?result.status, "Skipping URL");
            continue;
        }
        let record = registry.dispatch(&result.url, &result.html).with_country(country);
        debug!(
            url = %record.url,
            source = %record.source,
            title = %truncate_for_log(&record.title, 80),
            "Parsed article"
        );
        records.push(record);
    }

    info!(
        country,
        fetched = report.fetched,
        skipped = report.skipped(),
        "Crawled URL list"
    );
    (records, report)
}

/// Crawl every configured URL list and write the crawl table.
///
/// Lists that do not exist are logged and left out.
///
/// # Arguments
///
/// * `config` - Pipeline config supplying the URL lists and output path
/// * `fetcher` - Fetcher used for every URL, one at a time
/// * `registry` - Site table used to extract each fetched page
///
/// # Returns
///
/// Per-status fetch counts across all lists, or
/// [`PipelineError::NoInput`] when none of the configured lists exist.
#[instrument(level = "info", skip_all)]
pub async fn run_crawl<C: HttpClient>(
    config: &PipelineConfig,
    fetcher: &Fetcher<C>,
    registry: &Registry,
) -> Result<CrawlReport, PipelineError> {
    let mut lists_found = 0usize;
    let mut records = Vec::new();
    let mut report = CrawlReport::default();

    for list in &config.url_lists {
        let urls = match load_url_list(&list.file) {
            Ok(urls) => urls,
            Err(e) => {
                warn!(path = %list.file.display(), error = %e, "URL list unavailable; skipping");
                continue;
            }
        };
        lists_found += 1;
        info!(path = %list.file.display(), country = %list.country, count = urls.len(), "Loaded URL list");

        let (list_records, list_report) = crawl_urls(fetcher, registry, &urls, &list.country).await;
        records.extend(list_records);
        report.merge(&list_report);
    }

    if lists_found == 0 {
        return Err(PipelineError::NoInput(format!(
            "none of the {} configured URL lists exist",
            config.url_lists.len()
        )));
    }

    let out = &config.paths.news_raw;
    ensure_parent_dir(out).await?;
    write_csv(out, &NEWS_COLUMNS, records.iter().map(Record::news_cells))?;

    info!(
        path = %out.display(),
        records = records.len(),
        urls = report.urls,
        fetched = report.fetched,
        skipped_non_html = report.skipped_non_html,
        http_errors = report.http_errors,
        network_errors = report.network_errors,
        "Crawl complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UrlListConfig;
    use crate::fetch::tests::{FakeOrigin, Reply, instant_config};
    use crate::table::read_csv;

    const ARTICLE: &str = r#"<html><head><meta property="article:published_time" content="2025-03-12"></head>
        <body><h1>Rates held steady</h1>
        <p>The central bank left its benchmark rate unchanged on Wednesday, citing stable inflation.</p>
        </body></html>"#;

    #[test]
    fn test_parse_url_list() {
        let text = "\n# comment\nhttps://a.test/1\n  https://a.test/2  \n\nhttps://a.test/1\n#https://a.test/3\n";
        assert_eq!(parse_url_list(text), vec!["https://a.test/1", "https://a.test/2"]);
    }

    #[tokio::test]
    async fn test_pdf_is_skipped_once_and_others_fetched() {
        let origin = FakeOrigin::default()
            .with("https://a.test/1", vec![Reply::Html(ARTICLE)])
            .with("https://b.test/2", vec![Reply::Html(ARTICLE)])
            .with("https://c.test/report.pdf", vec![Reply::Pdf])
            .with("https://d.test/4", vec![Reply::Html(ARTICLE)]);
        let fetcher = Fetcher::new(&origin, &instant_config());
        let urls: Vec<String> = [
            "https://a.test/1",
            "https://b.test/2",
            "https://c.test/report.pdf",
            "https://d.test/4",
        ]
        .map(String::from)
        .to_vec();

        let (records, report) = crawl_urls(&fetcher, &Registry::default(), &urls, "US").await;

        assert_eq!(report.fetched, 3);
        assert_eq!(report.skipped_non_html, 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(origin.hits("https://c.test/report.pdf"), 1);
        let sources: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["a.test", "b.test", "d.test"]);
        assert!(records.iter().all(|r| r.country == "US" && r.date == "2025-03-12"));
    }

    #[tokio::test]
    async fn test_run_crawl_skips_missing_list_and_writes_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("us.txt"), "https://a.test/1\nhttps://gone.test/x\n").unwrap();

        let mut config = PipelineConfig::default();
        config.url_lists = vec![
            UrlListConfig {
                file: "missing.txt".into(),
                country: "CN".to_string(),
            },
            UrlListConfig {
                file: "us.txt".into(),
                country: "US".to_string(),
            },
        ];
        let config = config.rooted(dir.path());

        let origin = FakeOrigin::default().with("https://a.test/1", vec![Reply::Html(ARTICLE)]);
        let fetcher = Fetcher::new(&origin, &instant_config());

        let report = run_crawl(&config, &fetcher, &Registry::default()).await.unwrap();
        assert_eq!(report.urls, 2);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.http_errors, 1);

        let table = read_csv(&config.paths.news_raw).unwrap();
        assert_eq!(table.columns(), NEWS_COLUMNS);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "title"), Some("Rates held steady"));
        assert_eq!(table.get(0, "country"), Some("US"));
    }

    #[tokio::test]
    async fn test_run_crawl_without_any_list_is_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().rooted(dir.path());
        let origin = FakeOrigin::default();
        let fetcher = Fetcher::new(&origin, &instant_config());

        let err = run_crawl(&config, &fetcher, &Registry::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoInput(_)));
        assert!(!config.paths.news_raw.exists());
    }
}
