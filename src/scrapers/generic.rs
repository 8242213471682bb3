//! Fallback extraction for sites without a profile.
//!
//! Title is the first `<h1>`, else `<title>`; content is every `<p>` on the
//! page in document order; the date always comes from the resolver.

use scraper::Html;

use super::{ExtractionStrategy, PARAGRAPH, paragraph_text, select_first, stripped_text};
use crate::date;
use crate::models::Extracted;

#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl ExtractionStrategy for Generic {
    fn extract(&self, document: &Html) -> Extracted {
        let title = select_first(document, &["h1", "title"])
            .map(|el| stripped_text(&el))
            .unwrap_or_default();
        let content = paragraph_text(document.select(&PARAGRAPH));
        let date = date::resolve(document);

        Extracted { title, date, content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefers_h1() {
        let html = "<html><head><title>Site | Story</title></head><body><h1>Story</h1></body></html>";
        assert_eq!(Generic.extract(&Html::parse_document(html)).title, "Story");
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let html = "<html><head><title>Site | Story</title></head><body><p>x</p></body></html>";
        assert_eq!(Generic.extract(&Html::parse_document(html)).title, "Site | Story");
    }

    #[test]
    fn test_content_is_all_paragraphs() {
        let html = r#"<html><body>
            <header><p>Menu</p></header>
            <main><p>First.</p><div><p>Second.</p></div></main>
            <time datetime="2025-01-01">New Year</time>
        </body></html>"#;
        let extracted = Generic.extract(&Html::parse_document(html));
        assert_eq!(extracted.content, "Menu First. Second.");
        assert_eq!(extracted.date, "2025-01-01");
    }

    #[test]
    fn test_empty_page() {
        let extracted = Generic.extract(&Html::parse_document(""));
        assert_eq!(extracted, Extracted::default());
    }
}
