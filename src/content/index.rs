//! JSON post index
//!
//! An alternative to the configured file list: `index.json` holds an ordered
//! array of post cards, and each post lives next to it as `SLUG.md`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{FetchError, PostSource, RenderPipeline, RenderedPost};
use crate::helpers::format_long_date;

/// Index errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed post index: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No post with slug '{0}' in the index")]
    UnknownSlug(String),

    #[error("Failed to render {slug}: {message}")]
    Render { slug: String, message: String },
}

/// Estimated reading time, as a number of minutes or free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadTime {
    Minutes(u32),
    Text(String),
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTime::Minutes(n) => write!(f, "{}", n),
            ReadTime::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One card of the post index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "readTime", default)]
    pub read_time: Option<ReadTime>,
    #[serde(default)]
    pub excerpt: String,
}

impl IndexEntry {
    /// `October 10, 2025 • 5 min read`
    pub fn meta_line(&self) -> String {
        let date = format_long_date(&self.date);
        match &self.read_time {
            Some(t) if date.is_empty() => format!("{} min read", t),
            Some(t) => format!("{} • {} min read", date, t),
            None => date,
        }
    }
}

/// The parsed index, in file order
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostIndex {
    pub entries: Vec<IndexEntry>,
}

impl PostIndex {
    /// Fetch and parse the index file
    pub async fn load<S: PostSource>(source: &S, file: &str) -> Result<Self, IndexError> {
        let text = source.fetch(file).await?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, IndexError> {
        let entries: Vec<IndexEntry> = serde_json::from_str(text)?;
        Ok(Self { entries })
    }

    pub fn find(&self, slug: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.slug == slug)
    }
}

/// A post opened from the index
#[derive(Debug, Clone, Serialize)]
pub struct IndexedPost {
    pub entry: IndexEntry,
    pub post: RenderedPost,
}

/// Fetch `SLUG.md` and render it with the shared pipeline
pub async fn load_indexed_post<S: PostSource>(
    source: &S,
    index: &PostIndex,
    slug: &str,
    pipeline: &RenderPipeline,
) -> Result<IndexedPost, IndexError> {
    let entry = index
        .find(slug)
        .ok_or_else(|| IndexError::UnknownSlug(slug.to_string()))?;

    let file = format!("{}.md", slug);
    let raw = source.fetch(&file).await?;
    let post = pipeline
        .render(&raw, &file)
        .map_err(|e| IndexError::Render {
            slug: slug.to_string(),
            message: e.to_string(),
        })?;

    Ok(IndexedPost {
        entry: entry.clone(),
        post,
    })
}
