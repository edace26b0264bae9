//! Error types shared by the wind pipeline crates.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// Errors raised by the shared domain types.
#[derive(Debug, Error)]
pub enum WindError {
    #[error("No feasible model cycle for valid time {valid_time} within {max_hours_back}h look-back")]
    NoFeasibleCycle {
        valid_time: DateTime<Utc>,
        max_hours_back: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<serde_json::Error> for WindError {
    fn from(err: serde_json::Error) -> Self {
        WindError::InvalidConfig(format!("JSON error: {}", err))
    }
}
