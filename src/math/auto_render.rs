//! Auto-render of delimited math left in the HTML
//!
//! Only text between tags is scanned. Text inside ignored elements
//! (`pre`, `code`, `script`, ...) or inside already typeset output is copied
//! through untouched, so code samples with dollar signs stay literal.

use lazy_static::lazy_static;
use regex::Regex;

use super::{default_delimiters, Delimiter, MathRenderer};
use crate::helpers::unescape_html;

lazy_static! {
    static ref CLASS_RE: Regex =
        Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Options for [`render_math_in_html`]
#[derive(Debug, Clone)]
pub struct AutoRenderOptions {
    /// Tried in order at every position
    pub delimiters: Vec<Delimiter>,
    pub ignored_tags: Vec<String>,
    /// Elements carrying one of these classes are not scanned
    pub ignored_classes: Vec<String>,
}

impl Default for AutoRenderOptions {
    fn default() -> Self {
        Self {
            delimiters: default_delimiters(),
            ignored_tags: ["script", "noscript", "style", "textarea", "pre", "code"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignored_classes: vec!["katex".to_string(), "math-display".to_string()],
        }
    }
}

impl AutoRenderOptions {
    pub fn new(delimiters: Vec<Delimiter>, ignored_tags: Vec<String>) -> Self {
        Self {
            delimiters,
            ignored_tags: ignored_tags.into_iter().map(|t| t.to_lowercase()).collect(),
            ..Default::default()
        }
    }

    fn skips(&self, tag: &str, attrs: &str) -> bool {
        if self.ignored_tags.iter().any(|t| t == tag) {
            return true;
        }
        CLASS_RE.captures(attrs).is_some_and(|caps| {
            let classes = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            classes
                .split_whitespace()
                .any(|c| self.ignored_classes.iter().any(|ignored| ignored == c))
        })
    }
}

/// A parsed tag: `<name attrs>` or `</name>`
struct Tag<'a> {
    name: String,
    attrs: &'a str,
    closing: bool,
    self_closing: bool,
}

/// Typeset every delimited math span found in the HTML text
pub fn render_math_in_html(
    html: &str,
    options: &AutoRenderOptions,
    renderer: &dyn MathRenderer,
) -> String {
    let mut out = String::with_capacity(html.len());
    // (tag name, skipped)
    let mut stack: Vec<(String, bool)> = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |i| i + 3);
            out.push_str(&rest[..end]);
            pos += end;
            continue;
        }

        if let Some((tag, len)) = parse_tag(rest) {
            out.push_str(&rest[..len]);
            pos += len;

            if tag.closing {
                if let Some(i) = stack.iter().rposition(|(name, _)| *name == tag.name) {
                    stack.truncate(i);
                }
            } else if !tag.self_closing && !VOID_ELEMENTS.contains(&tag.name.as_str()) {
                let parent_skipped = stack.last().is_some_and(|(_, skipped)| *skipped);
                let skipped = parent_skipped || options.skips(&tag.name, tag.attrs);
                stack.push((tag.name, skipped));
            }
            continue;
        }

        // Text runs up to the next tag-like '<'
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let text_end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
        let text = &rest[..text_end];
        if stack.last().is_some_and(|(_, skipped)| *skipped) {
            out.push_str(text);
        } else {
            out.push_str(&render_text(text, options, renderer));
        }
        pos += text_end;
    }

    out
}

/// Parse a start or end tag at the beginning of `s`, returning it and its length
fn parse_tag(s: &str) -> Option<(Tag<'_>, usize)> {
    let after = s.strip_prefix('<')?;
    let (closing, after) = match after.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, after),
    };
    if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    // Find the closing '>' outside quoted attribute values
    let mut quote: Option<char> = None;
    let mut end = None;
    for (i, c) in after.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }
    let end = end?;
    let inner = &after[..end];

    let name_len = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();
    let attrs = &inner[name_len..];

    let prefix_len = if closing { 2 } else { 1 };
    Some((
        Tag {
            name,
            attrs,
            closing,
            self_closing: inner.trim_end().ends_with('/'),
        },
        prefix_len + end + 1,
    ))
}

/// Render the math spans of a single text run
fn render_text(text: &str, options: &AutoRenderOptions, renderer: &dyn MathRenderer) -> String {
    let mut out = String::with_capacity(text.len());
    let mut literal_start = 0;
    let mut i = 0;

    'scan: while i < text.len() {
        let rest = &text[i..];
        for delimiter in options.delimiters.iter().filter(|d| rest.starts_with(&d.left)) {
            if delimiter.left.starts_with('$') && text[..i].ends_with('\\') {
                continue;
            }
            let content_start = i + delimiter.left.len();
            let Some(end) = find_end_of_math(&delimiter.right, text, content_start) else {
                continue;
            };
            let span_end = end + delimiter.right.len();
            let raw = if delimiter.is_environment() {
                &text[i..span_end]
            } else {
                &text[content_start..end]
            };
            if raw.trim().is_empty() {
                continue;
            }

            out.push_str(&text[literal_start..i]);
            let tex = unescape_html(raw);
            match renderer.render(&tex, delimiter.display) {
                Ok(rendered) => out.push_str(&rendered),
                Err(e) => {
                    tracing::warn!("KaTeX auto-render error: {}", e);
                    out.push_str(&text[i..span_end]);
                }
            }
            i = span_end;
            literal_start = i;
            continue 'scan;
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&text[literal_start..]);
    out
}

/// Find the closing delimiter at brace depth zero, skipping escaped characters
fn find_end_of_math(delimiter: &str, text: &str, start: usize) -> Option<usize> {
    let mut index = start;
    let mut brace_level = 0i32;
    let mut chars = text[start..].chars();

    while let Some(c) = chars.next() {
        if brace_level <= 0 && text[index..].starts_with(delimiter) {
            return Some(index);
        }
        index += c.len_utf8();
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    index += escaped.len_utf8();
                }
            }
            '{' => brace_level += 1,
            '}' => brace_level -= 1,
            _ => {}
        }
    }

    None
}
