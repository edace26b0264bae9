//! Common types and utilities shared across the wind tile pipeline.

pub mod bbox;
pub mod config;
pub mod error;
pub mod grid;
pub mod metadata;
pub mod naming;
pub mod tile;
pub mod time;

pub use bbox::BoundingBox;
pub use config::{EncodingRange, ResampleConfig, ResampleMode, TileConfig, WindConfig};
pub use error::{WindError, WindResult};
pub use grid::RegularGrid;
pub use naming::{ArtifactKey, RunStamp};
pub use tile::{TileCoord, TileRange};
pub use time::{CycleResolver, CycleResolverConfig, CycleSelection};
