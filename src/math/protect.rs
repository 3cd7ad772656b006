//! Block math protection
//!
//! Display (`$$ ... $$`) and AMS environment blocks are pulled out of the
//! Markdown before conversion and replaced by opaque tokens. The tokens use
//! rare Unicode brackets so neither pulldown-cmark nor the sanitizer touches
//! them, and the sources come back during hydration.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // `$$ ... $$`, multi-line, opening delimiter not escaped
    static ref DISPLAY_RE: Regex = Regex::new(r"(?s)(^|[^\\])\$\$(.+?)\$\$").unwrap();
    static ref AMS_BEGIN_RE: Regex =
        Regex::new(r"\\begin\{(align\*?|aligned|gather\*?|equation\*?|multline\*?)\}").unwrap();
}

/// A protected math block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathBlock {
    /// Placeholder token standing in for the block
    pub key: String,
    /// Math source handed to the typesetter
    pub tex: String,
}

/// Markdown with its block math replaced by placeholder tokens
#[derive(Debug, Clone, Default)]
pub struct ProtectedMarkdown {
    pub text: String,
    pub blocks: Vec<MathBlock>,
}

/// Placeholder token for the `n`th block of a document
pub fn placeholder_key(n: usize) -> String {
    format!("⟪KXBLOCK:{}⟫", n)
}

/// Extract display and AMS blocks, replacing each with a unique token
pub fn protect_block_math(markdown: &str) -> ProtectedMarkdown {
    let mut blocks = Vec::new();

    let text = DISPLAY_RE.replace_all(markdown, |caps: &Captures| {
        let key = placeholder_key(blocks.len());
        blocks.push(MathBlock {
            key: key.clone(),
            tex: caps[2].trim().to_string(),
        });
        format!("{}{}", &caps[1], key)
    });

    let text = protect_environments(&text, &mut blocks);

    if !blocks.is_empty() {
        tracing::debug!("Protected {} math block(s)", blocks.len());
    }

    ProtectedMarkdown { text, blocks }
}

/// Replace `\begin{ENV}...\end{ENV}` spans; begin and end names must match
fn protect_environments(text: &str, blocks: &mut Vec<MathBlock>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut search_from = 0;

    while let Some(caps) = AMS_BEGIN_RE.captures_at(text, search_from) {
        let begin = caps.get(0).map_or(0..0, |m| m.range());
        let env = &caps[1];
        let end_marker = format!("\\end{{{}}}", env);

        // The body must hold at least one character
        let body_start = begin.end;
        let search_start = next_char_boundary(text, body_start);
        let end = text
            .get(search_start..)
            .and_then(|rest| rest.find(&end_marker))
            .map(|pos| search_start + pos);

        let Some(end) = end else {
            search_from = next_char_boundary(text, begin.start);
            continue;
        };

        let key = placeholder_key(blocks.len());
        blocks.push(MathBlock {
            key: key.clone(),
            tex: format!("\\begin{{{}}}{}{}", env, &text[body_start..end], end_marker),
        });

        out.push_str(&text[cursor..begin.start]);
        out.push_str(&key);
        cursor = end + end_marker.len();
        search_from = cursor;
    }

    out.push_str(&text[cursor..]);
    out
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    let mut next = index + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}
