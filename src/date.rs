//! Publication-date heuristics shared by every extraction strategy.
//!
//! [`resolve`] walks [`DATE_RULES`] in order and returns the first non-empty
//! answer:
//!
//! 1. `<time>` element: `datetime` attribute, then its text
//! 2. `<meta>` publication-time properties and names
//! 3. first element whose class contains a time/date-ish substring
//! 4. regexes over the visible page text: date+time, date only, "Month D, YYYY"
//!
//! Structured signals outrank free text, and full datetimes outrank bare dates.
//! The returned string is not normalized.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::scrapers::{spaced_text, stripped_text};

/// One step of the cascade.
pub type DateRule = fn(&Html) -> Option<String>;

/// The cascade, in priority order.
pub const DATE_RULES: [(&str, DateRule); 4] = [
    ("time_element", from_time_element),
    ("meta", from_meta),
    ("class_name", from_class_name),
    ("visible_text", from_visible_text),
];

const META_PROPERTIES: [&str; 3] = [
    "article:published_time",
    "og:published_time",
    "article:modified_time",
];

const META_NAMES: [&str; 6] = [
    "pubdate",
    "publishdate",
    "publish_time",
    "ptime",
    "date",
    "sailthru.date",
];

const CLASS_PATTERNS: [&str; 8] = [
    "time",
    "date",
    "pubtime",
    "pub_time",
    "publish",
    "article-time",
    "news-time",
    "time-source",
];

/// Elements whose text never counts as visible.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static CLASSED_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[class]").unwrap());

/// Date-text patterns, tried in order against the visible page text.
static TEXT_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        // 2025-03-12 10:30:00, 2025/3/12, 2025年3月12日 10:30
        Regex::new(r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}(?:日)?\s*\d{0,2}:?\d{0,2}:?\d{0,2}?").unwrap(),
        Regex::new(r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}(?:日)?").unwrap(),
        Regex::new(
            r"(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}",
        )
        .unwrap(),
    ]
});

/// Resolve a publication date for `document`. Empty when every rule misses.
pub fn resolve(document: &Html) -> String {
    DATE_RULES
        .iter()
        .find_map(|(name, rule)| {
            let found = rule(document).filter(|d| !d.is_empty())?;
            debug!(rule = name, date = %found, "Resolved date");
            Some(found)
        })
        .unwrap_or_default()
}

pub fn from_time_element(document: &Html) -> Option<String> {
    let time = document.select(&TIME_SELECTOR).next()?;
    time.value()
        .attr("datetime")
        .map(str::trim)
        .filter(|dt| !dt.is_empty())
        .map(str::to_string)
        .or_else(|| non_empty(stripped_text(&time)))
}

pub fn from_meta(document: &Html) -> Option<String> {
    let by_property = META_PROPERTIES.iter().map(|p| format!(r#"meta[property="{p}"]"#));
    let by_name = META_NAMES.iter().map(|n| format!(r#"meta[name="{n}"]"#));

    by_property.chain(by_name).find_map(|css| {
        let selector = Selector::parse(&css).ok()?;
        let meta = document.select(&selector).next()?;
        meta.value()
            .attr("content")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    })
}

/// Only the first element per pattern is consulted; if its text is blank the
/// next pattern gets a turn.
pub fn from_class_name(document: &Html) -> Option<String> {
    CLASS_PATTERNS.iter().find_map(|pattern| {
        let element = document.select(&CLASSED_SELECTOR).find(|el| {
            el.value()
                .classes()
                .any(|class| class.to_lowercase().contains(pattern))
        })?;
        non_empty(spaced_text(&element))
    })
}

pub fn from_visible_text(document: &Html) -> Option<String> {
    let text = visible_text(document);
    TEXT_PATTERNS
        .iter()
        .find_map(|re| re.find(&text))
        .map(|m| m.as_str().trim().to_string())
}

/// All text nodes outside script/style, trimmed and joined with spaces.
pub fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
            let trimmed = text.trim();
            (!hidden && !trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_time_element_prefers_datetime_attr() {
        let d = doc(r#"<time datetime=" 2025-03-12T08:00:00Z ">March 12</time>"#);
        assert_eq!(from_time_element(&d).as_deref(), Some("2025-03-12T08:00:00Z"));
    }

    #[test]
    fn test_time_element_falls_back_to_text() {
        let d = doc("<p>x</p><time> 12 March 2025 </time>");
        assert_eq!(from_time_element(&d).as_deref(), Some("12 March 2025"));
    }

    #[test]
    fn test_meta_property_order() {
        let d = doc(
            r#"<head>
                <meta property="article:modified_time" content="2025-03-13">
                <meta property="og:published_time" content="2025-03-12">
            </head>"#,
        );
        assert_eq!(from_meta(&d).as_deref(), Some("2025-03-12"));
    }

    #[test]
    fn test_meta_name_used_when_no_property() {
        let d = doc(r#"<head><meta name="sailthru.date" content="2025-01-02 09:00"></head>"#);
        assert_eq!(from_meta(&d).as_deref(), Some("2025-01-02 09:00"));
    }

    #[test]
    fn test_meta_ignores_empty_content() {
        let d = doc(
            r#"<head><meta property="article:published_time" content=" ">
               <meta name="pubdate" content="2024-12-31"></head>"#,
        );
        assert_eq!(from_meta(&d).as_deref(), Some("2024-12-31"));
    }

    #[test]
    fn test_class_name_case_insensitive() {
        let d = doc(r#"<div class="Article-PubTime"> 2025-03-12   10:00 </div>"#);
        assert_eq!(from_class_name(&d).as_deref(), Some("2025-03-12 10:00"));
    }

    #[test]
    fn test_class_name_pattern_order() {
        // "time" is tried before "date", so the second div wins.
        let d = doc(r#"<div class="date">Jan 1</div><span class="news-time">Jan 2</span>"#);
        assert_eq!(from_class_name(&d).as_deref(), Some("Jan 2"));
    }

    #[test]
    fn test_visible_text_datetime_before_date() {
        let d = doc("<p>Posted 2025/3/12 10:30 by staff</p>");
        assert_eq!(from_visible_text(&d).as_deref(), Some("2025/3/12 10:30"));
    }

    #[test]
    fn test_visible_text_cjk_date() {
        let d = doc("<p>来源：人民网 2025年3月12日 北京</p>");
        assert_eq!(from_visible_text(&d).as_deref(), Some("2025年3月12日"));
    }

    #[test]
    fn test_visible_text_english_month() {
        let d = doc("<p>Updated March 12, 2025 at noon</p>");
        assert_eq!(from_visible_text(&d).as_deref(), Some("March 12, 2025"));
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let d = doc(r#"<script>var d = "2020-01-01";</script><p>June 5, 2024</p>"#);
        assert_eq!(from_visible_text(&d).as_deref(), Some("June 5, 2024"));
    }

    #[test]
    fn test_resolve_meta_outranks_free_text() {
        let d = doc(
            r#"<head><meta property="article:published_time" content="2025-03-12T08:00:00+08:00"></head>
               <body><p>Event on 2024-01-01 drew crowds.</p></body>"#,
        );
        assert_eq!(resolve(&d), "2025-03-12T08:00:00+08:00");
    }

    #[test]
    fn test_resolve_time_element_outranks_meta() {
        let d = doc(
            r#"<head><meta name="date" content="2025-01-01"></head>
               <body><time datetime="2025-02-02">Feb 2</time></body>"#,
        );
        assert_eq!(resolve(&d), "2025-02-02");
    }

    #[test]
    fn test_resolve_total_miss_is_empty() {
        let d = doc("<html><body><p>No dates here at all.</p></body></html>");
        assert_eq!(resolve(&d), "");
    }
}
