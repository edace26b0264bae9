//! Factory selecting a resampler from configuration.
//!
//! The factory owns the injected capabilities (currently the spatial index
//! builder) so that callers only pass a [`ResampleConfig`]. A reprojecting
//! resampler without an index is rejected here, before any data is fetched.

use std::sync::Arc;

use crate::error::{ResampleError, Result};
use crate::resample::{NearestNeighborResampler, PassThroughResampler, Resampler};
use crate::spatial::{RTreeIndexBuilder, SpatialIndexBuilder};
use wind_common::{ResampleConfig, ResampleMode};

/// Creates resamplers that share one spatial index implementation.
#[derive(Clone, Default)]
pub struct ResamplerFactory {
    index_builder: Option<Arc<dyn SpatialIndexBuilder>>,
}

impl ResamplerFactory {
    /// A factory without spatial indexing; only pass-through is available.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory backed by the R-tree index.
    pub fn with_rtree() -> Self {
        Self::new().with_index_builder(Arc::new(RTreeIndexBuilder))
    }

    pub fn with_index_builder(mut self, builder: Arc<dyn SpatialIndexBuilder>) -> Self {
        self.index_builder = Some(builder);
        self
    }

    pub fn has_spatial_index(&self) -> bool {
        self.index_builder.is_some()
    }

    /// Build the resampler named by `config.mode`.
    pub fn create(&self, config: &ResampleConfig) -> Result<Arc<dyn Resampler>> {
        config.validate().map_err(ResampleError::InvalidGrid)?;

        match config.mode {
            ResampleMode::Reproject => {
                let builder = self.index_builder.clone().ok_or_else(|| {
                    ResampleError::dependency_unavailable(
                        "reprojection requires a spatial index implementation",
                    )
                })?;
                Ok(Arc::new(NearestNeighborResampler::new(
                    builder,
                    config.max_distance_deg,
                )))
            }
            ResampleMode::PassThrough => Ok(Arc::new(PassThroughResampler)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproject_requires_index() {
        let config = ResampleConfig::default();
        let result = ResamplerFactory::new().create(&config);
        assert!(matches!(result, Err(ResampleError::DependencyUnavailable(_))));

        let resampler = ResamplerFactory::with_rtree().create(&config).unwrap();
        assert!(resampler.reprojects());
        assert_eq!(resampler.name(), "nearest");
    }

    #[test]
    fn test_pass_through_needs_no_index() {
        let config = ResampleConfig {
            mode: ResampleMode::PassThrough,
            ..Default::default()
        };
        let resampler = ResamplerFactory::new().create(&config).unwrap();
        assert!(!resampler.reprojects());
    }
}
