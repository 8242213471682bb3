//! BOM-prefixed CSV writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

use crate::error::TableError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `header` and `rows` to `path` as UTF-8 CSV with a leading BOM.
/// The parent directory must already exist.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_csv<I, R, S>(path: &Path, header: &[&str], rows: I) -> Result<usize, TableError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(UTF8_BOM)?;

    let mut writer = ::csv::Writer::from_writer(out);
    writer.write_record(header)?;
    let mut count = 0usize;
    for row in rows {
        writer.write_record(row)?;
        count += 1;
    }
    writer.flush()?;

    info!(rows = count, "Wrote CSV");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_csv;

    #[test]
    fn test_write_csv_has_bom_and_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![vec!["人民网", "a, b"], vec!["", "line\nbreak"]];

        let written = write_csv(&path, &["source", "content"], rows).unwrap();
        assert_eq!(written, 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let table = read_csv(&path).unwrap();
        assert_eq!(table.columns(), ["source", "content"]);
        assert_eq!(table.get(0, "content"), Some("a, b"));
        assert_eq!(table.get(1, "source"), None);
        assert_eq!(table.get(1, "content"), Some("line\nbreak"));
    }

    #[test]
    fn test_write_csv_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let rows: Vec<Vec<&str>> = Vec::new();

        assert_eq!(write_csv(&path, &["title", "url"], rows).unwrap(), 0);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "\u{feff}title,url\n");
    }
}
