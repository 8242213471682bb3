//! CNN Lite (`lite.cnn.com`) article pages.
//!
//! The text-only edition keeps markup minimal: one `.headline--lite` and one
//! `.article--lite` container. No dedicated date element, so dates always
//! come from the heuristic resolver.

use super::SiteProfile;

pub static PROFILE: SiteProfile = SiteProfile {
    title: &[".headline--lite"],
    date: &[],
    body: &[".article--lite"],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::ExtractionStrategy;
    use scraper::Html;

    #[test]
    fn test_extract_cnn_lite_article() {
        let html = r#"<html><body>
            <h2 class="headline--lite">Storm hits coast</h2>
            <p class="timestamp--lite">Updated: 9:00 AM EDT, Wed May 7, 2025</p>
            <article class="article--lite">
                <p class="paragraph--lite">Winds reached 90 mph.</p>
                <p class="paragraph--lite">Power is out.</p>
            </article>
        </body></html>"#;
        let extracted = PROFILE.extract(&Html::parse_document(html));

        assert_eq!(extracted.title, "Storm hits coast");
        assert_eq!(extracted.date, "Updated: 9:00 AM EDT, Wed May 7, 2025");
        assert_eq!(extracted.content, "Winds reached 90 mph. Power is out.");
    }
}
