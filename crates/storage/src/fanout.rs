//! Sink that duplicates writes to several backends.

use crate::error::StorageResult;
use crate::sink::ArtifactSink;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Forwards each write to every inner sink, in order.
///
/// The first failing sink aborts the write; sinks after it are not called.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ArtifactSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl ArtifactSink for FanoutSink {
    fn name(&self) -> &str {
        "fanout"
    }

    async fn put(&self, path: &str, data: Bytes) -> StorageResult<()> {
        for sink in &self.sinks {
            sink.put(path, data.clone()).await?;
        }
        Ok(())
    }
}
