//! Native-grid output with rows flipped to north-up.

use super::Resampler;
use crate::error::{ResampleError, Result};
use crate::types::{ResampledField, VectorField};
use tracing::warn;
use wind_common::RegularGrid;

/// Keeps the source grid as-is apart from a vertical flip.
///
/// GRIB fields scan south to north, so row 0 of the source is the southern
/// edge. The output is only approximately geographic: pixels stay on the
/// native projection and `bounds` is the extent of the source coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughResampler;

impl Resampler for PassThroughResampler {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn reprojects(&self) -> bool {
        false
    }

    fn resample(&self, field: &VectorField, _target: &RegularGrid) -> Result<ResampledField> {
        if field.is_empty() {
            return Err(ResampleError::EmptySource);
        }
        let bounds = field.bounds().ok_or(ResampleError::EmptySource)?;

        let (width, height) = (field.width(), field.height());
        let mut u = Vec::with_capacity(field.len());
        let mut v = Vec::with_capacity(field.len());
        let mut valid_mask = Vec::with_capacity(field.len());

        for row in (0..height).rev() {
            let start = row * width;
            let src_u = &field.u()[start..start + width];
            let src_v = &field.v()[start..start + width];
            for (&su, &sv) in src_u.iter().zip(src_v) {
                let valid = !su.is_nan() && !sv.is_nan();
                u.push(if valid { su } else { 0.0 });
                v.push(if valid { sv } else { 0.0 });
                valid_mask.push(valid);
            }
        }

        warn!(
            width,
            height,
            "Output keeps the native projection; pixels are not on a regular lat/lon grid"
        );

        Ok(ResampledField {
            width,
            height,
            u,
            v,
            valid_mask,
            bounds,
            reprojected: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wind_common::BoundingBox;

    #[test]
    fn test_rows_are_flipped() {
        let field = VectorField::new(
            2,
            2,
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0.0, 0.0, 0.0, f32::NAN],
            vec![30.0, 30.0, 31.0, 31.0],
            vec![-100.0, -99.0, -100.0, -99.0],
        )
        .unwrap();
        let target = RegularGrid::conus();
        let out = PassThroughResampler.resample(&field, &target).unwrap();

        assert_eq!(out.u, vec![3.0, 0.0, 1.0, 2.0]);
        assert_eq!(out.valid_mask, vec![true, false, true, true]);
        assert_eq!(out.bounds, BoundingBox::new(-100.0, 30.0, -99.0, 31.0));
        assert!(!out.reprojected);
    }

    #[test]
    fn test_no_finite_coordinates() {
        let field =
            VectorField::new(1, 1, vec![1.0], vec![1.0], vec![f64::NAN], vec![0.0]).unwrap();
        let result = PassThroughResampler.resample(&field, &RegularGrid::conus());
        assert!(matches!(result, Err(ResampleError::EmptySource)));
    }
}
