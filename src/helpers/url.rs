//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Unreserved characters stay as they are in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/blog/") // -> "/site/blog/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// URL of a top-level section; the default section lives at the root
pub fn section_url(config: &SiteConfig, id: &str) -> String {
    if id == config.default_section {
        url_for(config, "")
    } else {
        url_for(config, &format!("{}/", encode_url(id)))
    }
}

/// URL of a post addressed through the JSON index
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("posts/{}/", encode_url(slug)))
}

/// Encode a URL path segment
pub fn encode_url(path: &str) -> String {
    utf8_percent_encode(path, PATH_SEGMENT).to_string()
}
