//! Post render pipeline
//!
//! front matter -> title/date headings -> block math protection -> Markdown
//! -> sanitize -> block math hydration -> inline math typesetting

use anyhow::Result;

use super::headings::{extract_title_and_date, resolve_date, resolve_title};
use super::{FrontMatter, MarkdownRenderer, RenderedPost, Sanitizer};
use crate::config::SiteConfig;
use crate::math::{protect_block_math, AutoRenderOptions, KatexRenderer, MathEngine};

/// Turns raw post text into a [`RenderedPost`]
pub struct RenderPipeline {
    markdown: MarkdownRenderer,
    sanitizer: Sanitizer,
    math: Option<MathEngine>,
}

impl RenderPipeline {
    pub fn new(markdown: MarkdownRenderer, sanitizer: Sanitizer, math: Option<MathEngine>) -> Self {
        Self {
            markdown,
            sanitizer,
            math,
        }
    }

    /// Build the pipeline described by the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        let math = config.math.enable.then(|| {
            MathEngine::new(
                Box::new(KatexRenderer::from_config(&config.math)),
                AutoRenderOptions::new(
                    config.math.delimiters.clone(),
                    config.math.ignored_tags.clone(),
                ),
            )
        });

        Self::new(
            MarkdownRenderer::from_config(&config.markdown),
            Sanitizer::new(),
            math,
        )
    }

    pub fn math_enabled(&self) -> bool {
        self.math.is_some()
    }

    /// Render a post file's raw text
    pub fn render(&self, raw: &str, file_name: &str) -> Result<RenderedPost> {
        let (meta, body) = FrontMatter::parse(raw);
        let extracted = extract_title_and_date(body);

        let title = resolve_title(&meta, &extracted, file_name);
        let date = resolve_date(&meta, &extracted);
        let html = self.render_body(&extracted.body)?;

        tracing::debug!("Rendered {} ({:?})", file_name, title);

        Ok(RenderedPost {
            file: file_name.to_string(),
            title,
            date,
            html,
            meta,
        })
    }

    /// Render Markdown with math, without front-matter or heading handling
    pub fn render_body(&self, markdown: &str) -> Result<String> {
        let Some(engine) = &self.math else {
            let html = self.markdown.render(markdown)?;
            return Ok(self.sanitizer.clean(&html));
        };

        let protected = protect_block_math(markdown);
        let html = self.markdown.render(&protected.text)?;
        let html = self.sanitizer.clean(&html);
        Ok(engine.typeset(&html, &protected.blocks))
    }
}
