//! Core field types.

use crate::error::{ResampleError, Result};
use projection::normalize_longitude;
use wind_common::BoundingBox;

/// A wind field on its native grid.
///
/// All arrays are row-major with `width * height` elements. Row order is
/// whatever the source used; coordinates travel with every sample.
#[derive(Debug, Clone)]
pub struct VectorField {
    width: usize,
    height: usize,
    u: Vec<f32>,
    v: Vec<f32>,
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl VectorField {
    /// Build a field, checking every array against `width * height`.
    ///
    /// Longitudes are normalized to `[-180, 180)`.
    pub fn new(
        width: usize,
        height: usize,
        u: Vec<f32>,
        v: Vec<f32>,
        lats: Vec<f64>,
        mut lons: Vec<f64>,
    ) -> Result<Self> {
        let expected = width * height;
        for (array, len) in [
            ("u", u.len()),
            ("v", v.len()),
            ("lat", lats.len()),
            ("lon", lons.len()),
        ] {
            if len != expected {
                return Err(ResampleError::shape_mismatch(array, expected, len));
            }
        }

        for lon in lons.iter_mut() {
            if lon.is_finite() {
                *lon = normalize_longitude(*lon);
            }
        }

        Ok(Self {
            width,
            height,
            u,
            v,
            lats,
            lons,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn u(&self) -> &[f32] {
        &self.u
    }

    pub fn v(&self) -> &[f32] {
        &self.v
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Extent of all finite coordinates.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.lons, &self.lats)
    }
}

/// A field sampled onto a north-up raster.
///
/// Wherever `valid_mask` is false, `u` and `v` are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledField {
    pub width: usize,
    pub height: usize,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub valid_mask: Vec<bool>,
    /// Geographic extent of the raster.
    pub bounds: BoundingBox,
    /// False when the raster is the native grid rather than a lat/lon grid.
    pub reprojected: bool,
}

impl ResampledField {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn valid_count(&self) -> usize {
        self.valid_mask.iter().filter(|&&valid| valid).count()
    }

    /// Fraction of cells carrying data, in `[0, 1]`.
    pub fn valid_fraction(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.valid_count() as f64 / self.len() as f64
    }

    /// (u, v, valid) at a cell.
    pub fn get(&self, row: usize, col: usize) -> Option<(f32, f32, bool)> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let idx = row * self.width + col;
        Some((self.u[idx], self.v[idx], self.valid_mask[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch() {
        let result = VectorField::new(
            2,
            2,
            vec![0.0; 4],
            vec![0.0; 3],
            vec![0.0; 4],
            vec![0.0; 4],
        );
        assert!(matches!(
            result,
            Err(ResampleError::ShapeMismatch {
                array: "v",
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_longitudes_normalized() {
        let field = VectorField::new(
            2,
            1,
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![30.0, 30.0],
            vec![262.5, -97.5],
        )
        .unwrap();
        assert_eq!(field.lons(), &[-97.5, -97.5]);
    }

    #[test]
    fn test_valid_fraction() {
        let field = ResampledField {
            width: 2,
            height: 2,
            u: vec![1.0, 0.0, 0.0, 0.0],
            v: vec![1.0, 0.0, 0.0, 0.0],
            valid_mask: vec![true, false, false, false],
            bounds: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            reprojected: true,
        };
        assert_eq!(field.valid_count(), 1);
        assert_eq!(field.valid_fraction(), 0.25);
        assert_eq!(field.get(0, 0), Some((1.0, 1.0, true)));
        assert_eq!(field.get(2, 0), None);
    }
}
