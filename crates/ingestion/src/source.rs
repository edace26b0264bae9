//! Wind data sources.

use async_trait::async_trait;
use grid_processor::VectorField;
use wind_common::CycleSelection;

use crate::error::Result;

/// A decoded field together with where it came from.
#[derive(Debug, Clone)]
pub struct SourcedField {
    pub field: VectorField,
    /// Source identity recorded in metadata (URL or file name).
    pub source_id: String,
}

/// Supplies 10 m wind for a model cycle and lead time.
#[async_trait]
pub trait WindSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch and decode the field valid at `selection.valid_time()`.
    async fn fetch(&self, selection: &CycleSelection) -> Result<SourcedField>;
}
