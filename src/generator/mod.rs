//! Generator module - writes the composed site to the public directory

mod compose;

pub use compose::Composer;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::templates::STYLESHEET;
use crate::Folio;

/// Static site generator
pub struct Generator {
    folio: Folio,
    composer: Composer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            composer: Composer::new(folio)?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<()> {
        let public_dir = &self.folio.public_dir;
        fs::create_dir_all(public_dir)?;

        write_file(&public_dir.join("css/style.css"), STYLESHEET)?;

        self.generate_sections().await?;
        self.generate_indexed_posts().await?;

        self.copy_assets(&self.folio.source_dir)?;
        if self.folio.config.index.enable {
            self.copy_assets(&self.folio.index_dir)?;
        }

        Ok(())
    }

    /// One page per section; the default section is the site index
    async fn generate_sections(&self) -> Result<()> {
        let config = &self.folio.config;
        for section in &config.sections {
            let html = self.composer.render_section(&section.id).await?;
            let path = self.section_path(&section.id);
            write_file(&path, &html)?;
            tracing::debug!("Generated: {:?}", path);
        }
        tracing::info!("Generated {} section page(s)", config.sections.len());
        Ok(())
    }

    /// `posts/SLUG/index.html` for every post in the JSON index
    async fn generate_indexed_posts(&self) -> Result<()> {
        let slugs = self.composer.index_slugs().await;
        for slug in &slugs {
            if slug.is_empty() || slug.starts_with('.') || slug.contains(['/', '\\']) {
                tracing::warn!("Skipping index entry with unusable slug {:?}", slug);
                continue;
            }
            let html = self.composer.render_indexed_post(slug).await?;
            let path = self
                .folio
                .public_dir
                .join("posts")
                .join(slug)
                .join("index.html");
            write_file(&path, &html)?;
            tracing::debug!("Generated: {:?}", path);
        }
        if !slugs.is_empty() {
            tracing::info!("Generated {} indexed post(s)", slugs.len());
        }
        Ok(())
    }

    fn section_path(&self, id: &str) -> PathBuf {
        if id == self.folio.config.default_section {
            self.folio.public_dir.join("index.html")
        } else {
            self.folio.public_dir.join(id).join("index.html")
        }
    }

    /// Copy images and other non-Markdown files
    fn copy_assets(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }
        let index_file = dir.join(&self.folio.config.index.file);

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path == index_file {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            // Skip markdown files (they are rendered into pages)
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?}", relative);
        }

        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
