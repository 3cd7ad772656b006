//! Where post files come from

use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Post fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid post name: {0}")]
    InvalidName(String),
}

/// Fetches raw post text by file name
pub trait PostSource {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Reads posts from a directory on disk
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` under the root, refusing anything that escapes it
    fn resolve(&self, name: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(name);
        let plain = !name.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(FetchError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl PostSource for FsSource {
    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let path = self.resolve(name)?;
        tracing::debug!("Reading post {:?}", path);

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FetchError::NotFound(name.to_string()),
                _ => FetchError::Io {
                    name: name.to_string(),
                    source: e,
                },
            })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::{FetchError, PostSource};

    /// In-memory posts keyed by file name
    #[derive(Default)]
    pub struct MemorySource {
        pub files: HashMap<String, String>,
    }

    impl MemorySource {
        pub fn with(mut self, name: &str, content: &str) -> Self {
            self.files.insert(name.to_string(), content.to_string());
            self
        }
    }

    impl PostSource for MemorySource {
        async fn fetch(&self, name: &str) -> Result<String, FetchError> {
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(name.to_string()))
        }
    }
}
