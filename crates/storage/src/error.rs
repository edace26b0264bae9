//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid artifact path: {0}")]
    InvalidPath(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}
