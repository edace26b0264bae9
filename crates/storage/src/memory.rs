//! In-memory sink.

use crate::error::StorageResult;
use crate::sink::{check_relative, ArtifactSink};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Keeps every artifact in a sorted map; used for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.lock().get(path).cloned()
    }

    /// Stored paths in lexical order.
    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Bytes>> {
        // A poisoned map is still consistent: inserts are single operations.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, path: &str, data: Bytes) -> StorageResult<()> {
        check_relative(path)?;
        self.lock().insert(path.to_string(), data);
        Ok(())
    }
}
