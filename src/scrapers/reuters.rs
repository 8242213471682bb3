//! Reuters (`reuters.com`) article pages.
//!
//! The byline `<time>` carries human-readable text; its `datetime` attribute
//! is only used when the text is blank.

use super::SiteProfile;

pub static PROFILE: SiteProfile = SiteProfile {
    title: &["h1"],
    date: &["time"],
    body: &[r#"div[data-testid="article-body"]"#],
};
