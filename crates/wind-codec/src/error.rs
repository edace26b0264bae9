//! Error types for wind encoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{array} has {actual} elements, expected {expected}")]
    DimensionMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Png(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Png(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
