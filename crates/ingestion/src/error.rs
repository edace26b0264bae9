//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while producing one unit or a batch.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Missing wind component: {0}")]
    MissingComponent(String),

    #[error("Failed to decode GRIB2 data: {0}")]
    Decode(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("No data source for {0}")]
    NotAvailable(String),

    #[error("No unit of the batch succeeded ({attempted} attempted)")]
    EmptyBatch { attempted: usize },

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Config(#[from] wind_common::WindError),

    #[error(transparent)]
    Resample(#[from] grid_processor::ResampleError),

    #[error(transparent)]
    Codec(#[from] wind_codec::CodecError),

    #[error(transparent)]
    Tiles(#[from] tile_pyramid::TileError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error("Failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl IngestionError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
