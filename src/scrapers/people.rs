//! People's Daily (`people.com.cn`) article pages.
//!
//! Body text lives in `div#rwb_zw` on most channels; older templates use
//! `.rm_txt_con` or a bare `div.article`.

use super::SiteProfile;

pub static PROFILE: SiteProfile = SiteProfile {
    title: &["h1", "h2"],
    date: &["span.publish-time", "span.date", "div.sou"],
    body: &["div#rwb_zw", "div.rm_txt_con", "div.article"],
};
