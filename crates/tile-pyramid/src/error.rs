//! Error types for tile partitioning.

use thiserror::Error;
use wind_codec::CodecError;

pub type Result<T> = std::result::Result<T, TileError>;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("Invalid zoom range: {min}..={max}")]
    InvalidZoomRange { min: u32, max: u32 },

    #[error("Invalid tile size: {0}")]
    InvalidTileSize(u32),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Raster error: {0}")]
    Raster(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] CodecError),
}
