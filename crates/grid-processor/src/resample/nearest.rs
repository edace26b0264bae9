//! Nearest-neighbour reprojection with a distance cutoff.

use super::Resampler;
use crate::error::{ResampleError, Result};
use crate::spatial::SpatialIndexBuilder;
use crate::types::{ResampledField, VectorField};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};
use wind_common::RegularGrid;

/// Copies each target cell's value from the closest source sample.
///
/// Cells whose nearest sample is farther than `max_distance_deg`, or whose
/// nearest sample is missing (NaN), are marked invalid and zeroed.
pub struct NearestNeighborResampler {
    index_builder: Option<Arc<dyn SpatialIndexBuilder>>,
    max_distance_deg: f64,
}

impl NearestNeighborResampler {
    pub fn new(index_builder: Arc<dyn SpatialIndexBuilder>, max_distance_deg: f64) -> Self {
        Self {
            index_builder: Some(index_builder),
            max_distance_deg,
        }
    }

    /// A resampler with no spatial index; every call fails with
    /// [`ResampleError::DependencyUnavailable`].
    pub fn without_index(max_distance_deg: f64) -> Self {
        Self {
            index_builder: None,
            max_distance_deg,
        }
    }

    pub fn max_distance_deg(&self) -> f64 {
        self.max_distance_deg
    }
}

impl Resampler for NearestNeighborResampler {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn reprojects(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(width = target.width, height = target.height))]
    fn resample(&self, field: &VectorField, target: &RegularGrid) -> Result<ResampledField> {
        let builder = self.index_builder.as_ref().ok_or_else(|| {
            ResampleError::dependency_unavailable("no spatial index configured for reprojection")
        })?;

        target.validate().map_err(ResampleError::InvalidGrid)?;

        if field.is_empty() {
            return Err(ResampleError::EmptySource);
        }

        let index = builder.build(field.lats(), field.lons());
        if index.is_empty() {
            return Err(ResampleError::EmptySource);
        }
        debug!(
            index = builder.name(),
            points = index.len(),
            "Built spatial index"
        );

        let (u_src, v_src) = (field.u(), field.v());
        let max_distance = self.max_distance_deg;

        let rows: Vec<(Vec<f32>, Vec<f32>, Vec<bool>)> = (0..target.height)
            .into_par_iter()
            .map(|row| {
                let lat = target.lat_at(row);
                let mut u = vec![0.0f32; target.width];
                let mut v = vec![0.0f32; target.width];
                let mut valid = vec![false; target.width];

                for col in 0..target.width {
                    let Some(neighbor) = index.nearest(lat, target.lon_at(col)) else {
                        continue;
                    };
                    if neighbor.distance > max_distance {
                        continue;
                    }
                    let (su, sv) = (u_src[neighbor.index], v_src[neighbor.index]);
                    if su.is_nan() || sv.is_nan() {
                        continue;
                    }
                    u[col] = su;
                    v[col] = sv;
                    valid[col] = true;
                }
                (u, v, valid)
            })
            .collect();

        let mut u = Vec::with_capacity(target.len());
        let mut v = Vec::with_capacity(target.len());
        let mut valid_mask = Vec::with_capacity(target.len());
        for (row_u, row_v, row_valid) in rows {
            u.extend(row_u);
            v.extend(row_v);
            valid_mask.extend(row_valid);
        }

        let resampled = ResampledField {
            width: target.width,
            height: target.height,
            u,
            v,
            valid_mask,
            bounds: target.bounds(),
            reprojected: true,
        };

        debug!(
            valid = resampled.valid_count(),
            total = resampled.len(),
            valid_pct = resampled.valid_fraction() * 100.0,
            "Resampled onto regular grid"
        );

        Ok(resampled)
    }
}
