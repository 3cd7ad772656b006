//! HTML helper functions

use lazy_static::lazy_static;
use regex::Regex;

use super::url::url_for;
use crate::config::SiteConfig;

lazy_static! {
    static ref KATEX_MATHML_RE: Regex =
        Regex::new(r#"(?s)<span class="katex-mathml">.*?</math></span>"#).unwrap();
}

/// Generate a stylesheet link tag
///
/// # Examples
/// ```ignore
/// css(&config, "style.css") // -> <link rel="stylesheet" href="/css/style.css">
/// ```
pub fn css(config: &SiteConfig, path: &str) -> String {
    let href =
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
            path.to_string()
        } else {
            let path = if path.ends_with(".css") {
                path.to_string()
            } else {
                format!("{}.css", path)
            };
            url_for(config, &format!("css/{}", path.trim_start_matches('/')))
        };

    format!(r#"<link rel="stylesheet" href="{}">"#, html_escape(&href))
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Unescape the entities pulldown-cmark and ammonia emit in text
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Visible text of rendered HTML; KaTeX MathML copies are dropped
pub fn html_to_text(html: &str) -> String {
    let html = KATEX_MATHML_RE.replace_all(html, "");
    unescape_html(&strip_html(&html))
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

/// Plain-text summary of rendered HTML, for meta descriptions
pub fn summarize(html: &str, length: usize) -> String {
    let text = html_to_text(html);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&text, length, None)
}
