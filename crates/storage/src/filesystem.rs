//! Local filesystem sink.

use crate::error::{StorageError, StorageResult};
use crate::sink::{check_relative, ArtifactSink};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Writes artifacts below a root directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    root: PathBuf,
}

impl FilesystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of an artifact path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

#[async_trait]
impl ArtifactSink for FilesystemSink {
    fn name(&self) -> &str {
        "filesystem"
    }

    #[instrument(skip(self, data), fields(root = %self.root.display(), path = %path))]
    async fn put(&self, path: &str, data: Bytes) -> StorageResult<()> {
        check_relative(path)?;
        let target = self.resolve(path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&target, &data)
            .await
            .map_err(|source| StorageError::Io {
                path: target.clone(),
                source,
            })?;

        debug!(size = data.len(), "Wrote artifact");
        Ok(())
    }
}
