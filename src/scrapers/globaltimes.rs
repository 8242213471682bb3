//! Global Times Chinese edition (`globaltimes.cn`).

use super::SiteProfile;

pub static PROFILE: SiteProfile = SiteProfile {
    title: &["h1"],
    date: &["span.pub_time", "span.time"],
    // "artical" is the site's own spelling on older pages.
    body: &["div.article-content", "div.artical-content"],
};
