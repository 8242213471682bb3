//! Small helpers for text cleanup, logging, and output paths.

use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Collapse every run of whitespace to a single space and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  a\n\t b  "), "a b");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with `"…(+N chars)"` appended.
/// Counts characters, not bytes, so CJK text never splits mid-codepoint.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Make sure the directory that will hold `file` exists.
#[instrument(level = "debug", skip_all, fields(path = %file.display()))]
pub async fn ensure_parent_dir(file: &Path) -> std::io::Result<()> {
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
        debug!(dir = %parent.display(), "Output directory ready");
    }
    Ok(())
}
