//! Content module - post fetching, parsing and rendering

mod frontmatter;
pub mod headings;
pub mod index;
pub mod loader;
mod markdown;
mod pipeline;
mod post;
mod sanitize;
pub mod source;

pub use frontmatter::FrontMatter;
pub use index::{load_indexed_post, IndexEntry, IndexError, IndexedPost, PostIndex};
pub use loader::{BlogListing, PostEntry, PostLoader};
pub use markdown::MarkdownRenderer;
pub use pipeline::RenderPipeline;
pub use post::RenderedPost;
pub use sanitize::Sanitizer;
pub use source::{FetchError, FsSource, PostSource};
