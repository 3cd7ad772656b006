//! Math handling: protect display/AMS blocks from Markdown, then hydrate
//! and typeset them with KaTeX.

mod auto_render;
mod hydrate;
mod protect;
mod typeset;

use serde::{Deserialize, Serialize};

pub use auto_render::{render_math_in_html, AutoRenderOptions};
pub use hydrate::{hydrate_block_math, mount_blocks, render_mounts};
pub use protect::{placeholder_key, protect_block_math, MathBlock, ProtectedMarkdown};
pub use typeset::{KatexRenderer, MathError, MathRenderer};

/// A pair of math delimiters recognized by the auto renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delimiter {
    pub left: String,
    pub right: String,
    pub display: bool,
}

impl Delimiter {
    pub fn new(left: &str, right: &str, display: bool) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            display,
        }
    }

    /// `\begin{..}` delimiters are handed to KaTeX together with their content
    pub fn is_environment(&self) -> bool {
        self.left.starts_with("\\begin{")
    }
}

/// Delimiters scanned after hydration; `$$` must come before `$`
pub fn default_delimiters() -> Vec<Delimiter> {
    vec![
        Delimiter::new("$$", "$$", true),
        Delimiter::new("$", "$", false),
        Delimiter::new("\\(", "\\)", false),
        Delimiter::new("\\[", "\\]", true),
        Delimiter::new("\\begin{equation}", "\\end{equation}", true),
        Delimiter::new("\\begin{align}", "\\end{align}", true),
        Delimiter::new("\\begin{aligned}", "\\end{aligned}", true),
        Delimiter::new("\\begin{gather}", "\\end{gather}", true),
    ]
}

/// Math engine used by the render pipeline
pub struct MathEngine {
    pub renderer: Box<dyn MathRenderer + Send + Sync>,
    pub auto_render: AutoRenderOptions,
}

impl MathEngine {
    pub fn new(
        renderer: Box<dyn MathRenderer + Send + Sync>,
        auto_render: AutoRenderOptions,
    ) -> Self {
        Self {
            renderer,
            auto_render,
        }
    }

    /// Hydrate protected blocks, then typeset remaining delimited math
    pub fn typeset(&self, html: &str, blocks: &[MathBlock]) -> String {
        let html = hydrate_block_math(html, blocks, self.renderer.as_ref());
        render_math_in_html(&html, &self.auto_render, self.renderer.as_ref())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{MathError, MathRenderer};

    /// Renders `tex` verbatim inside a katex-classed span; fails on `\fail`
    pub struct FakeRenderer;

    impl MathRenderer for FakeRenderer {
        fn render(&self, tex: &str, display: bool) -> Result<String, MathError> {
            if tex.contains("\\fail") {
                return Err(MathError::Render {
                    tex: tex.to_string(),
                    message: "Undefined control sequence: \\fail".to_string(),
                });
            }
            let mode = if display { "display" } else { "inline" };
            Ok(format!(
                r#"<span class="katex" data-mode="{}">{}</span>"#,
                mode,
                crate::helpers::html_escape(tex)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeRenderer;
    use super::*;

    #[test]
    fn test_default_delimiters_order() {
        let delimiters = default_delimiters();
        assert_eq!(delimiters[0].left, "$$");
        assert_eq!(delimiters[1].left, "$");
        assert!(delimiters[4].is_environment());
        assert!(!delimiters[2].is_environment());
    }

    #[test]
    fn test_engine_typesets_blocks_and_inline() {
        let engine = MathEngine::new(Box::new(FakeRenderer), AutoRenderOptions::default());
        let protected = protect_block_math("Inline $a$ and\n\n$$b^2$$\n");
        let html = format!("<p>{}</p>", protected.text.replace("\n\n", "</p><p>"));
        let out = engine.typeset(&html, &protected.blocks);
        assert!(out.contains(r#"data-mode="inline">a</span>"#));
        assert!(out.contains(r#"data-mode="display">b^2</span>"#));
        assert!(!out.contains("KXBLOCK"));
    }
}
