//! The artifact sink abstraction.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;

/// Destination for published artifacts.
///
/// Paths are relative, `/`-separated keys such as
/// `wind-particles/20260226T14z/01/3/1/3.png`.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Store `data` at `path`, replacing any previous content.
    async fn put(&self, path: &str, data: Bytes) -> StorageResult<()>;
}

/// MIME type for an artifact path, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Reject absolute paths and parent-directory segments.
pub(crate) fn check_relative(path: &str) -> StorageResult<()> {
    if path.is_empty()
        || path.starts_with('/')
        || path.split('/').any(|segment| segment == ".." || segment.is_empty())
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
