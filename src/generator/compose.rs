//! Page composition shared by the generator and the dev server

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{SectionConfig, SiteConfig};
use crate::content::{
    load_indexed_post, BlogListing, FsSource, IndexError, PostIndex, PostLoader, RenderPipeline,
};
use crate::helpers::{css, post_url, section_url};
use crate::nav::SectionSwitcher;
use crate::templates::{
    BlogData, IndexCard, NavItem, PostPageData, PostView, SectionData, SiteData, TemplateRenderer,
};
use crate::Folio;

/// Builds complete HTML pages; posts are re-read on every call
pub struct Composer {
    config: SiteConfig,
    base_dir: PathBuf,
    pipeline: RenderPipeline,
    templates: TemplateRenderer,
    posts: FsSource,
    index: FsSource,
    live_reload: bool,
}

impl Composer {
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            config: folio.config.clone(),
            base_dir: folio.base_dir.clone(),
            pipeline: RenderPipeline::from_config(&folio.config),
            templates: TemplateRenderer::new()?,
            posts: FsSource::new(&folio.source_dir),
            index: FsSource::new(&folio.index_dir),
            live_reload: false,
        })
    }

    /// Inject the live reload hook into every page
    pub fn with_live_reload(mut self, enable: bool) -> Self {
        self.live_reload = enable;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    fn site_data(&self) -> SiteData {
        let config = &self.config;
        SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
            stylesheet: css(config, "style"),
            katex_css: (self.pipeline.math_enabled() && !config.math.css.is_empty())
                .then(|| css(config, &config.math.css)),
            live_reload: self.live_reload,
        }
    }

    fn nav_items(&self, switcher: &SectionSwitcher) -> Vec<NavItem> {
        switcher
            .links()
            .into_iter()
            .map(|link| NavItem {
                href: section_url(&self.config, &link.id),
                id: link.id,
                name: link.name,
                active: link.active,
            })
            .collect()
    }

    /// Render the page for section `id`
    pub async fn render_section(&self, id: &str) -> Result<String> {
        let mut switcher = SectionSwitcher::from_config(&self.config)?;
        let change = switcher.show(id)?;

        let section = switcher.active().clone();
        let content = self.section_content(&section).await;
        let blog = if change.load_blog {
            Some(self.blog_data().await)
        } else {
            None
        };

        let data = SectionData {
            id: section.id,
            name: section.name,
            content,
        };
        self.templates
            .render_section(&self.site_data(), &self.nav_items(&switcher), &data, blog.as_ref())
    }

    /// Render the page of an indexed post; load failures become an error page
    pub async fn render_indexed_post(&self, slug: &str) -> Result<String> {
        let mut switcher = SectionSwitcher::from_config(&self.config)?;
        if switcher.show(&self.config.blog_section).is_err() {
            tracing::debug!("Blog section {} is not configured", self.config.blog_section);
        }

        let messages = &self.config.messages;
        let mut page = PostPageData {
            back_href: section_url(&self.config, &self.config.blog_section),
            back_label: messages.back_to_blog.clone(),
            title: String::new(),
            meta: String::new(),
            html: String::new(),
            error: None,
        };

        match self.open_indexed_post(slug).await {
            Ok((title, meta, html)) => {
                page.title = title;
                page.meta = meta;
                page.html = html;
            }
            Err(e) => {
                tracing::warn!("Error loading blog post {}: {}", slug, e);
                page.title = messages.post_error.clone();
                page.error = Some(messages.post_error.clone());
            }
        }

        self.templates
            .render_post(&self.site_data(), &self.nav_items(&switcher), &page)
    }

    async fn open_indexed_post(&self, slug: &str) -> Result<(String, String, String), IndexError> {
        let index = PostIndex::load(&self.index, &self.config.index.file).await?;
        let opened = load_indexed_post(&self.index, &index, slug, &self.pipeline).await?;
        Ok((opened.entry.title.clone(), opened.entry.meta_line(), opened.post.html))
    }

    /// Slugs listed in the JSON index, empty when the index is off or broken
    pub async fn index_slugs(&self) -> Vec<String> {
        if !self.config.index.enable {
            return Vec::new();
        }
        match PostIndex::load(&self.index, &self.config.index.file).await {
            Ok(index) => index.entries.into_iter().map(|e| e.slug).collect(),
            Err(e) => {
                tracing::warn!("Error loading blog posts: {}", e);
                Vec::new()
            }
        }
    }

    /// Load the configured posts, plus index cards when the index is on
    pub async fn blog_data(&self) -> BlogData {
        let loader = PostLoader::new(&self.posts, &self.pipeline, &self.config.messages);
        let listing = loader.load(&self.config.posts).await;
        let mut blog = blog_from_listing(listing);

        if self.config.index.enable {
            match PostIndex::load(&self.index, &self.config.index.file).await {
                Ok(index) => {
                    blog.cards = index
                        .entries
                        .iter()
                        .map(|e| IndexCard {
                            href: post_url(&self.config, &e.slug),
                            title: e.title.clone(),
                            meta: e.meta_line(),
                            excerpt: e.excerpt.clone(),
                        })
                        .collect();
                    if !blog.cards.is_empty() && blog.posts.is_empty() {
                        blog.placeholder = None;
                    }
                }
                Err(e) => {
                    tracing::warn!("Error loading blog posts: {}", e);
                    if blog.posts.is_empty() {
                        blog.placeholder = Some(self.config.messages.index_error.clone());
                    }
                }
            }
        }

        blog
    }

    /// Render a section's optional Markdown body
    async fn section_content(&self, section: &SectionConfig) -> String {
        let Some(file) = &section.content else {
            return String::new();
        };

        let path = self.base_dir.join(file);
        let rendered = match tokio::fs::read_to_string(&path).await {
            Ok(markdown) => self.pipeline.render_body(&markdown),
            Err(e) => Err(e.into()),
        };
        rendered.unwrap_or_else(|e| {
            tracing::warn!("Failed to render section {} from {:?}: {}", section.id, path, e);
            String::new()
        })
    }
}

fn blog_from_listing(listing: BlogListing) -> BlogData {
    BlogData {
        posts: listing
            .entries
            .into_iter()
            .map(|entry| PostView {
                slug: entry.post.slug(),
                toggle_id: entry.toggle_id,
                expanded: entry.expanded,
                title: entry.post.title,
                date: entry.post.date,
                html: entry.post.html,
            })
            .collect(),
        cards: Vec::new(),
        placeholder: listing.placeholder,
    }
}
