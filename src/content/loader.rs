//! Post loader - fetches and renders the configured post list

use serde::Serialize;

use super::{PostSource, RenderPipeline, RenderedPost};
use crate::config::MessagesConfig;

/// One collapsible entry in the blog list
#[derive(Debug, Clone, Serialize)]
pub struct PostEntry {
    /// `post-toggle-N`, N counting successfully loaded posts
    pub toggle_id: String,
    pub expanded: bool,
    pub post: RenderedPost,
}

impl PostEntry {
    fn new(index: usize, post: RenderedPost) -> Self {
        Self {
            toggle_id: format!("post-toggle-{}", index),
            expanded: false,
            post,
        }
    }

    /// Flip between collapsed and expanded
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }
}

/// The blog section's content: entries, or a placeholder when there are none
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlogListing {
    pub entries: Vec<PostEntry>,
    pub placeholder: Option<String>,
}

/// Loads posts in the configured order
pub struct PostLoader<'a, S> {
    source: &'a S,
    pipeline: &'a RenderPipeline,
    messages: &'a MessagesConfig,
}

impl<'a, S: PostSource> PostLoader<'a, S> {
    pub fn new(source: &'a S, pipeline: &'a RenderPipeline, messages: &'a MessagesConfig) -> Self {
        Self {
            source,
            pipeline,
            messages,
        }
    }

    /// Fetch and render every file, one after another, skipping failures
    pub async fn load(&self, files: &[String]) -> BlogListing {
        if files.is_empty() {
            return BlogListing {
                entries: Vec::new(),
                placeholder: Some(self.messages.no_posts.clone()),
            };
        }

        let mut entries = Vec::new();
        for file in files {
            match self.load_one(file).await {
                Ok(post) => entries.push(PostEntry::new(entries.len(), post)),
                Err(e) => tracing::warn!("Skipping post {}: {}", file, e),
            }
        }

        tracing::info!("Loaded {} of {} posts", entries.len(), files.len());

        let placeholder = entries
            .is_empty()
            .then(|| self.messages.all_failed.clone());
        BlogListing {
            entries,
            placeholder,
        }
    }

    async fn load_one(&self, file: &str) -> anyhow::Result<RenderedPost> {
        let raw = self.source.fetch(file).await?;
        self.pipeline.render(&raw, file)
    }
}
