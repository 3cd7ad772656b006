//! Block math hydration
//!
//! Tokens left by [`protect_block_math`](super::protect_block_math) are found
//! by plain string replacement in the sanitized HTML, turned into mount spans
//! carrying the encoded source, and each mount is then typeset in display mode.

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

use super::{MathBlock, MathRenderer};
use crate::helpers::html_escape;

/// Characters `encodeURIComponent` leaves alone
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

lazy_static! {
    static ref MOUNT_RE: Regex =
        Regex::new(r#"<span class="katex-mount" data-math="([^"]*)"></span>"#).unwrap();
}

/// Replace every token with a mount span holding the encoded math source
pub fn mount_blocks(html: &str, blocks: &[MathBlock]) -> String {
    let mut html = html.to_string();
    for block in blocks {
        if !html.contains(&block.key) {
            tracing::warn!("Math placeholder {} missing from rendered HTML", block.key);
            continue;
        }
        let mount = format!(
            r#"<span class="katex-mount" data-math="{}"></span>"#,
            utf8_percent_encode(&block.tex, URI_COMPONENT)
        );
        html = html.replace(&block.key, &mount);
    }
    html
}

/// Typeset every mount span in display mode
///
/// A failing block is logged and shown as its escaped source; this never fails.
pub fn render_mounts(html: &str, renderer: &dyn MathRenderer) -> String {
    MOUNT_RE
        .replace_all(html, |caps: &Captures| {
            let tex = percent_decode_str(&caps[1]).decode_utf8_lossy();
            let inner = match renderer.render(&tex, true) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::warn!("KaTeX display render error: {}", e);
                    html_escape(&tex)
                }
            };
            format!(r#"<span class="math-display">{}</span>"#, inner)
        })
        .into_owned()
}

/// Mount and typeset protected blocks
pub fn hydrate_block_math(
    html: &str,
    blocks: &[MathBlock],
    renderer: &dyn MathRenderer,
) -> String {
    if blocks.is_empty() {
        return html.to_string();
    }
    let mounted = mount_blocks(html, blocks);
    render_mounts(&mounted, renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::protect_block_math;
    use crate::math::testing::FakeRenderer;

    fn block(n: usize, tex: &str) -> MathBlock {
        MathBlock {
            key: crate::math::placeholder_key(n),
            tex: tex.to_string(),
        }
    }

    #[test]
    fn test_mount_encodes_source() {
        let blocks = vec![block(0, "a < b & \"c\"")];
        let html = mount_blocks("<p>⟪KXBLOCK:0⟫</p>", &blocks);
        assert_eq!(
            html,
            r#"<p><span class="katex-mount" data-math="a%20%3C%20b%20%26%20%22c%22"></span></p>"#
        );
    }

    #[test]
    fn test_hydrate_replaces_every_token() {
        let blocks = vec![block(0, "x^2"), block(1, "\\begin{align}y\\end{align}")];
        let html = "<p>⟪KXBLOCK:0⟫</p>\n<p>⟪KXBLOCK:1⟫</p>";
        let out = hydrate_block_math(html, &blocks, &FakeRenderer);
        assert!(!out.contains("KXBLOCK"));
        assert!(!out.contains("katex-mount"));
        assert!(out.contains(r#"<span class="katex" data-mode="display">x^2</span>"#));
        assert!(out.contains(r#"data-mode="display">\begin{align}y\end{align}</span>"#));
    }

    #[test]
    fn test_render_failure_falls_back_to_source() {
        let blocks = vec![block(0, "\\fail{<x>}"), block(1, "ok")];
        let html = "<p>⟪KXBLOCK:0⟫</p><p>⟪KXBLOCK:1⟫</p>";
        let out = hydrate_block_math(html, &blocks, &FakeRenderer);
        assert!(out.contains(r#"<span class="math-display">\fail{&lt;x&gt;}</span>"#));
        assert!(out.contains(r#"data-mode="display">ok</span>"#));
    }

    #[test]
    fn test_no_blocks_is_identity() {
        let html = "<p>⟪KXBLOCK:0⟫</p>";
        assert_eq!(hydrate_block_math(html, &[], &FakeRenderer), html);
    }

    #[test]
    fn test_round_trip_restores_sources() {
        let md = "Intro\n\n$$x^2$$\n\n\\begin{align}a &= b_1 * c_2\\end{align}\n";
        let protected = protect_block_math(md);
        let html = mount_blocks(&protected.text, &protected.blocks);

        let decoded: Vec<String> = MOUNT_RE
            .captures_iter(&html)
            .map(|c| percent_decode_str(&c[1]).decode_utf8_lossy().into_owned())
            .collect();
        let sources: Vec<&str> = protected.blocks.iter().map(|b| b.tex.as_str()).collect();
        assert_eq!(decoded, sources);
    }
}
