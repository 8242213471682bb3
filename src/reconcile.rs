//! Column classification for social-media exports.
//!
//! Export tools name their columns however they like (`content`, `微博正文`,
//! `发布时间`, `screen_name`, ...). [`reconcile`] maps each column to one of
//! the canonical fields using [`RULES`], an ordered list of small predicates:
//! all content rules first, then date rules, then user-name rules. The first
//! rule that matches claims the column and nothing else is tried for it.
//!
//! # Duplicate targets
//!
//! Several columns may land on the same field (e.g. both `content` and
//! `text`). [`project`] walks columns left to right and overwrites, so the
//! right-most column wins, even when its cell is empty.

use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::models::{EXPORT_COLUMNS, SourceType};
use crate::table::{Cell, RawTable};

/// Canonical fields an export column can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    Content,
    Date,
    UserName,
}

impl TargetField {
    pub fn column(&self) -> &'static str {
        match self {
            TargetField::Content => "content",
            TargetField::Date => "date",
            TargetField::UserName => "user_name",
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A column header in both spellings the rules look at.
#[derive(Debug, Clone)]
pub struct ColumnName<'a> {
    pub raw: &'a str,
    pub lower: String,
}

impl<'a> ColumnName<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }
}

/// One classification predicate.
#[derive(Clone, Copy)]
pub struct ColumnRule {
    pub target: TargetField,
    pub name: &'static str,
    pub matches: fn(&ColumnName<'_>) -> bool,
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRule")
            .field("target", &self.target)
            .field("name", &self.name)
            .finish()
    }
}

const fn rule(target: TargetField, name: &'static str, matches: fn(&ColumnName<'_>) -> bool) -> ColumnRule {
    ColumnRule { target, name, matches }
}

/// Every rule in evaluation order: content, then date, then user name.
pub const RULES: &[ColumnRule] = &[
    // content
    rule(TargetField::Content, "text", |c| c.lower == "text"),
    rule(TargetField::Content, "content", |c| c.lower == "content"),
    rule(TargetField::Content, "*content*", |c| c.lower.contains("content")),
    rule(TargetField::Content, "*微博内容*", |c| c.raw.contains("微博内容")),
    rule(TargetField::Content, "*微博正文*", |c| c.raw.contains("微博正文")),
    rule(TargetField::Content, "正文", |c| c.raw == "正文"),
    rule(TargetField::Content, "*内容 (not 转发)", |c| {
        c.raw.ends_with("内容") && !c.raw.contains("转发")
    }),
    // date
    rule(TargetField::Date, "created_at", |c| c.lower == "created_at"),
    rule(TargetField::Date, "publish_time", |c| c.lower == "publish_time"),
    rule(TargetField::Date, "*time*", |c| c.lower.contains("time")),
    rule(TargetField::Date, "*date*", |c| c.lower.contains("date")),
    rule(TargetField::Date, "*发布时间*", |c| c.raw.contains("发布时间")),
    rule(TargetField::Date, "*发表时间*", |c| c.raw.contains("发表时间")),
    rule(TargetField::Date, "时间", |c| c.raw == "时间"),
    // user name
    rule(TargetField::UserName, "*user_name*", |c| c.lower.contains("user_name")),
    rule(TargetField::UserName, "*username*", |c| c.lower.contains("username")),
    rule(TargetField::UserName, "*screen_name*", |c| c.lower.contains("screen_name")),
    rule(TargetField::UserName, "*用户昵称*", |c| c.raw.contains("用户昵称")),
    rule(TargetField::UserName, "*昵称* (not id)", |c| {
        c.raw.contains("昵称") && !c.lower.contains("id")
    }),
    rule(TargetField::UserName, "*微博作者*", |c| c.raw.contains("微博作者")),
    rule(TargetField::UserName, "*博主昵称*", |c| c.raw.contains("博主昵称")),
    rule(TargetField::UserName, "*作者名*", |c| c.raw.contains("作者名")),
];

/// First rule that claims `column`, if any.
pub fn classify(column: &str) -> Option<&'static ColumnRule> {
    let name = ColumnName::new(column);
    RULES.iter().find(|r| (r.matches)(&name))
}

/// One claimed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Position in the source table, so repeated header names stay distinct.
    pub index: usize,
    pub column: String,
    pub target: TargetField,
}

/// Result of classifying a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Claimed columns in original column order.
    pub assignments: Vec<Assignment>,
    /// Columns no rule claimed.
    pub unmapped: Vec<String>,
}

impl ColumnPlan {
    /// Target of the first column called `column`.
    #[cfg(test)]
    pub fn target_of(&self, column: &str) -> Option<TargetField> {
        self.assignments
            .iter()
            .find(|a| a.column == column)
            .map(|a| a.target)
    }

    /// Canonical fields no column was assigned to.
    pub fn missing_targets(&self) -> Vec<TargetField> {
        [TargetField::Date, TargetField::UserName, TargetField::Content]
            .into_iter()
            .filter(|t| !self.assignments.iter().any(|a| a.target == *t))
            .collect()
    }
}

/// Classify every column, in order. Each column is evaluated once and keeps
/// the first target it matches.
///
/// # Arguments
///
/// * `columns` - Header row of one export file, in file order
///
/// # Returns
///
/// A [`ColumnPlan`] listing claimed columns by position and the names no
/// rule matched.
#[instrument(level = "info", skip_all, fields(columns = columns.len()))]
pub fn reconcile<S: AsRef<str>>(columns: &[S]) -> ColumnPlan {
    let mut plan = ColumnPlan::default();
    for (index, column) in columns.iter().enumerate() {
        let column = column.as_ref();
        match classify(column) {
            Some(rule) => {
                debug!(column, target = %rule.target, rule = rule.name, "Column claimed");
                plan.assignments.push(Assignment {
                    index,
                    column: column.to_string(),
                    target: rule.target,
                });
            }
            None => plan.unmapped.push(column.to_string()),
        }
    }
    info!(
        mapped = plan.assignments.len(),
        unmapped = ?plan.unmapped,
        "Reconciled export columns"
    );
    plan
}

/// How reconciled rows are tagged.
#[derive(Debug, Clone)]
pub struct ExportTags {
    pub country: String,
    pub source: String,
}

/// Project `table` into [`EXPORT_COLUMNS`] using `plan`. Unassigned fields are
/// empty strings; on duplicate targets the right-most column wins.
pub fn project(table: &RawTable, plan: &ColumnPlan, tags: &ExportTags) -> RawTable {
    for target in plan.missing_targets() {
        warn!(column = %target, "Column not found; filled with empty string");
    }

    let mut out = RawTable::new(EXPORT_COLUMNS);
    for row in table.rows() {
        let mut content: Cell = None;
        let mut date: Cell = None;
        let mut user_name: Cell = None;
        for a in &plan.assignments {
            let cell = row.get(a.index).cloned().flatten();
            match a.target {
                TargetField::Content => content = cell,
                TargetField::Date => date = cell,
                TargetField::UserName => user_name = cell,
            }
        }
        out.push_row(vec![
            Some(tags.country.clone()),
            Some(tags.source.clone()),
            Some(SourceType::Social.to_string()),
            Some(date.unwrap_or_default()),
            Some(user_name.unwrap_or_default()),
            Some(content.unwrap_or_default()),
        ]);
    }
    out
}
