//! Merge the crawl table and the reconciled export table into one dataset.
//!
//! [`unify`] runs in two phases:
//!
//! 1. [`assemble`]: concatenate, pad every canonical column, backfill social
//!    titles from `user_name`, blank out missing values, and project onto
//!    [`CANONICAL_COLUMNS`]
//! 2. [`admit`]: drop rows whose `content` is [`MIN_CONTENT_CHARS`] characters
//!    or shorter, keeping the rest contiguous and in order

use tracing::{info, instrument};

use crate::models::{CANONICAL_COLUMNS, CanonicalRow, SourceType};
use crate::table::RawTable;

/// Rows need strictly more content characters than this to be admitted.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Source value that marks social-media rows for title backfill.
pub const SOCIAL_SOURCE: &str = "weibo";

/// The unified dataset, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedTable {
    pub rows: Vec<CanonicalRow>,
}

impl UnifiedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells in [`CANONICAL_COLUMNS`] order, for writing.
    pub fn records(&self) -> impl Iterator<Item = [&str; 7]> {
        self.rows.iter().map(|r| {
            [
                r.country.as_str(),
                r.source.as_str(),
                r.source_type.as_str(),
                r.date.as_str(),
                r.title.as_str(),
                r.content.as_str(),
                r.url.as_str(),
            ]
        })
    }
}

/// Concatenate `tables` and normalize them to the canonical schema, without
/// any filtering.
pub fn assemble(tables: Vec<RawTable>) -> UnifiedTable {
    let all = RawTable::concat(tables);

    let rows = (0..all.len())
        .map(|i| {
            let cell = |name: &str| all.get(i, name).unwrap_or_default().to_string();
            let mut row = CanonicalRow {
                country: cell("country"),
                source: cell("source"),
                source_type: cell("source_type"),
                date: cell("date"),
                title: cell("title"),
                content: cell("content"),
                url: cell("url"),
            };
            if row.title.is_empty() && is_social(&row) {
                row.title = cell("user_name");
            }
            row
        })
        .collect();

    UnifiedTable { rows }
}

/// Keep only rows with more than [`MIN_CONTENT_CHARS`] characters of content.
pub fn admit(table: UnifiedTable) -> UnifiedTable {
    UnifiedTable {
        rows: table
            .rows
            .into_iter()
            .filter(|r| r.content.chars().count() > MIN_CONTENT_CHARS)
            .collect(),
    }
}

/// Build the unified dataset from raw tables.
///
/// # Arguments
///
/// * `tables` - Raw tables in output order, typically crawl then exports
///
/// # Returns
///
/// Admitted rows in input order, each projected onto [`CANONICAL_COLUMNS`].
#[instrument(level = "info", skip_all, fields(tables = tables.len()))]
pub fn unify(tables: Vec<RawTable>) -> UnifiedTable {
    let assembled = assemble(tables);
    let before = assembled.len();
    let admitted = admit(assembled);
    info!(
        rows_before = before,
        rows_after = admitted.len(),
        dropped = before - admitted.len(),
        columns = ?CANONICAL_COLUMNS,
        "Unified dataset"
    );
    admitted
}

fn is_social(row: &CanonicalRow) -> bool {
    row.source == SOCIAL_SOURCE || row.source_type == SourceType::Social.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(prefix: &str) -> String {
        format!("{prefix} {}", "x".repeat(MIN_CONTENT_CHARS))
    }

    fn table(columns: &[&str], rows: Vec<Vec<&str>>) -> RawTable {
        let mut t = RawTable::new(columns.iter().copied());
        for row in rows {
            t.push_row(row.into_iter().map(|c| Some(c.to_string())).collect());
        }
        t
    }

    #[test]
    fn test_disjoint_tables_keep_every_row_before_filtering() {
        let a = table(&["title", "url"], (0..10).map(|_| vec!["t", "u"]).collect());
        let b = table(&["user_name", "extra"], (0..5).map(|_| vec!["n", "e"]).collect());

        let assembled = assemble(vec![a, b]);
        assert_eq!(assembled.len(), 15);
        let first = &assembled.rows[0];
        assert_eq!(first.title, "t");
        assert_eq!(first.content, "");
        assert_eq!(first.country, "");
        let last = &assembled.rows[14];
        assert_eq!(last.url, "");
        assert_eq!(last.title, "");
    }

    #[test]
    fn test_social_title_backfilled_from_user_name() {
        let news = table(
            &["title", "content", "source", "source_type"],
            vec![vec!["", "body", "people", "news"]],
        );
        let social = table(
            &["source", "source_type", "user_name", "content"],
            vec![vec!["weibo", "social", "小明", "post"]],
        );

        let assembled = assemble(vec![news, social]);
        assert_eq!(assembled.rows[0].title, "");
        assert_eq!(assembled.rows[1].title, "小明");
    }

    #[test]
    fn test_backfill_keeps_existing_title() {
        let t = table(
            &["source", "title", "user_name"],
            vec![vec!["weibo", "Original", "someone"]],
        );
        assert_eq!(assemble(vec![t]).rows[0].title, "Original");
    }

    #[test]
    fn test_missing_cells_become_empty_strings() {
        let mut t = RawTable::new(["country", "content"]);
        t.push_row(vec![None, Some("c".into())]);
        let row = &assemble(vec![t]).rows[0];
        assert_eq!(row.country, "");
        assert_eq!(row.content, "c");
    }

    #[test]
    fn test_admission_threshold_is_strict() {
        let exactly = "a".repeat(MIN_CONTENT_CHARS);
        let over = "a".repeat(MIN_CONTENT_CHARS + 1);
        let t = table(&["content"], vec![vec![exactly.as_str()], vec![over.as_str()], vec![""]]);

        let unified = unify(vec![t]);
        assert_eq!(unified.len(), 1);
        assert_eq!(unified.rows[0].content, over);
    }

    #[test]
    fn test_admission_counts_characters_not_bytes() {
        // 20 CJK characters are 60 bytes but only 20 characters.
        let short_cjk = "微".repeat(20);
        let t = table(&["content"], vec![vec![short_cjk.as_str()]]);
        assert!(unify(vec![t]).is_empty());
    }

    #[test]
    fn test_unify_preserves_order_and_drops_extras() {
        let a = table(&["content", "junk"], vec![vec![long("a1").as_str(), "j"], vec!["short", "j"]]);
        let b = table(&["content"], vec![vec![long("b1").as_str()]]);

        let unified = unify(vec![a, b]);
        let contents: Vec<&str> = unified.rows.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec![long("a1").as_str(), long("b1").as_str()]);
        assert_eq!(unified.records().next().map(|r| r.len()), Some(CANONICAL_COLUMNS.len()));
    }
}
