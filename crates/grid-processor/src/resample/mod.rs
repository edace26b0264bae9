//! Resampler implementations.

mod nearest;
mod pass_through;

pub use nearest::NearestNeighborResampler;
pub use pass_through::PassThroughResampler;

use crate::error::Result;
use crate::types::{ResampledField, VectorField};
use wind_common::RegularGrid;

/// Maps a native-grid field onto a north-up raster.
pub trait Resampler: Send + Sync {
    /// Resampler name, for logging and metadata.
    fn name(&self) -> &'static str;

    /// Whether output pixels follow `target` rather than the native grid.
    fn reprojects(&self) -> bool;

    fn resample(&self, field: &VectorField, target: &RegularGrid) -> Result<ResampledField>;
}
