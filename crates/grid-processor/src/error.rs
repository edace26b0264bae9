//! Error types for grid resampling.

use thiserror::Error;

/// Errors that can occur while resampling a field.
#[derive(Error, Debug)]
pub enum ResampleError {
    /// The source field has no usable samples.
    #[error("source field has no samples with finite coordinates")]
    EmptySource,

    /// A capability the resampler needs was not provided.
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Arrays handed to a field constructor disagree in length.
    #[error("{array} has {actual} elements, expected {expected}")]
    ShapeMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The target grid cannot be sampled.
    #[error("invalid target grid: {0}")]
    InvalidGrid(String),
}

impl ResampleError {
    /// Create a DependencyUnavailable error.
    pub fn dependency_unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(array: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            array,
            expected,
            actual,
        }
    }
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;
