//! In-memory raw tables and CSV ingestion.
//!
//! A [`RawTable`] is an ordered list of column names plus rows of optional
//! cells. `None` marks a missing value (an empty CSV field or a column the
//! row's source table never had); it only becomes `""` when a stage
//! projects into a canonical schema.
//!
//! Export files come from tools that do not agree on an encoding, so
//! [`read_csv`] tries UTF-8 first and falls back to GB18030.

use encoding_rs::GB18030;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::error::TableError;

pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, padding with `None` or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Index of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` in the first column called `name`; `None` when either is absent.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Add column `name` with `value` in every row, unless it already exists.
    pub fn ensure_column(&mut self, name: &str, value: Cell) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Stack tables vertically, keeping row order and aligning cells by
    /// column name. The result's columns are the union of all inputs in
    /// first-seen order; cells a table did not have are `None`.
    pub fn concat(tables: impl IntoIterator<Item = RawTable>) -> RawTable {
        let mut out = RawTable::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for table in tables {
            let targets: Vec<usize> = table
                .columns
                .iter()
                .map(|name| {
                    *positions.entry(name.clone()).or_insert_with(|| {
                        out.columns.push(name.clone());
                        out.columns.len() - 1
                    })
                })
                .collect();

            for row in table.rows {
                let mut merged = vec![None; out.columns.len()];
                for (cell, &target) in row.into_iter().zip(&targets) {
                    // Repeated header names collapse onto one column; first value wins.
                    if merged[target].is_none() {
                        merged[target] = cell;
                    }
                }
                out.rows.push(merged);
            }
        }

        let width = out.columns.len();
        for row in &mut out.rows {
            row.resize(width, None);
        }
        out
    }
}

/// Read a CSV file with a header row. Empty fields become `None`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_csv(path: &Path) -> Result<RawTable, TableError> {
    let bytes = std::fs::read(path)?;
    let text = decode(&bytes).ok_or_else(|| TableError::Undecodable {
        path: path.to_path_buf(),
    })?;
    let table = parse_csv(&text)?;
    info!(rows = table.len(), columns = ?table.columns(), "Loaded table");
    Ok(table)
}

pub fn parse_csv(text: &str) -> Result<RawTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut table = RawTable::new(reader.headers()?.iter().map(|h| h.trim().to_string()));
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| (!field.is_empty()).then(|| field.to_string()))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

/// UTF-8 (BOM stripped), else GB18030. `None` if both report malformed input.
pub fn decode(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(e) => {
            debug!(error = %e, "Not UTF-8; trying GB18030");
            let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
            if had_errors {
                warn!("GB18030 decoding failed too");
                None
            } else {
                Some(text.into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_parse_csv_empty_fields_are_missing() {
        let table = parse_csv("a,b,c\n1,,3\n").unwrap();
        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None, Some("3".to_string())]);
    }

    #[test]
    fn test_parse_csv_short_rows_are_padded() {
        let table = parse_csv("a,b\n1\n").unwrap();
        assert_eq!(table.get(0, "a"), Some("1"));
        assert_eq!(table.get(0, "b"), None);
    }

    #[test]
    fn test_parse_csv_quoted_multiline() {
        let table = parse_csv("content,date\n\"line one\nline two, still\",2025-03-12\n").unwrap();
        assert_eq!(table.get(0, "content"), Some("line one\nline two, still"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("微博内容".as_bytes());
        assert_eq!(decode(&bytes).as_deref(), Some("微博内容"));
    }

    #[test]
    fn test_decode_falls_back_to_gb18030() {
        let (bytes, _, _) = GB18030.encode("发布时间,用户昵称");
        assert!(std::str::from_utf8(&bytes).is_err());
        assert_eq!(decode(&bytes).as_deref(), Some("发布时间,用户昵称"));
    }

    #[test]
    fn test_read_csv_gb18030_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let (bytes, _, _) = GB18030.encode("微博正文,发布时间\n今天天气很好,2025-03-12 10:00\n");
        std::fs::write(&path, &bytes).unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.columns(), ["微博正文", "发布时间"]);
        assert_eq!(table.get(0, "微博正文"), Some("今天天气很好"));
    }

    #[test]
    fn test_read_csv_missing_file_is_io_error() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }

    #[test]
    fn test_concat_aligns_by_name() {
        let mut a = RawTable::new(["title", "content"]);
        a.push_row(cells(&["t1", "c1"]));
        let mut b = RawTable::new(["content", "user_name"]);
        b.push_row(cells(&["c2", "u2"]));

        let merged = RawTable::concat([a, b]);
        assert_eq!(merged.columns(), ["title", "content", "user_name"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(0, "user_name"), None);
        assert_eq!(merged.get(1, "title"), None);
        assert_eq!(merged.get(1, "content"), Some("c2"));
    }

    #[test]
    fn test_ensure_column_keeps_existing() {
        let mut t = RawTable::new(["source"]);
        t.push_row(cells(&["weibo"]));
        t.ensure_column("source", Some("news".into()));
        t.ensure_column("country", Some("CN".into()));
        assert_eq!(t.get(0, "source"), Some("weibo"));
        assert_eq!(t.get(0, "country"), Some("CN"));
    }
}
