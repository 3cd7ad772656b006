//! Render a single Markdown file to HTML

use anyhow::{Context, Result};
use std::path::Path;

use crate::content::{RenderPipeline, RenderedPost};
use crate::Folio;

/// Render `file` with the site's pipeline
pub fn render_file(folio: &Folio, file: &Path) -> Result<RenderedPost> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    RenderPipeline::from_config(&folio.config).render(&raw, name)
}

/// Print the rendered body, or the whole post as JSON
pub fn run(folio: &Folio, file: &Path, json: bool) -> Result<()> {
    let post = render_file(folio, file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        println!("{}", post.html);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_render_file() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.math.enable = false;
        let folio = Folio::with_config(dir.path().to_path_buf(), config);

        let file = dir.path().join("my-post.md");
        std::fs::write(&file, "---\ndate: 2025-10-01\n---\nSome *text*.").unwrap();

        let post = render_file(&folio, &file).unwrap();
        assert_eq!(post.title, "my post");
        assert_eq!(post.date, "2025-10-01");
        assert_eq!(post.html, "<p>Some <em>text</em>.</p>\n");

        assert!(render_file(&folio, &dir.path().join("missing.md")).is_err());
    }
}
