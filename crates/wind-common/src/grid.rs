//! Regular geographic output grids.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// A north-up regular lat/lon raster definition.
///
/// Pixel (0, 0) is the north-west corner. Rows run north to south and
/// columns west to east; the first and last row/column sample the bounds
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl RegularGrid {
    pub fn new(bounds: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            west: bounds.min_x,
            east: bounds.max_x,
            south: bounds.min_y,
            north: bounds.max_y,
            width,
            height,
        }
    }

    /// HRRR CONUS coverage at roughly 0.04 degree spacing.
    pub fn conus() -> Self {
        Self {
            west: -134.1,
            east: -60.9,
            south: 21.1,
            north: 52.6,
            width: 1799,
            height: 1059,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }

    /// Longitude sampled by a column.
    pub fn lon_at(&self, col: usize) -> f64 {
        if self.width <= 1 {
            return self.west;
        }
        self.west + (self.east - self.west) * col as f64 / (self.width - 1) as f64
    }

    /// Latitude sampled by a row. Row 0 is the northern edge.
    pub fn lat_at(&self, row: usize) -> f64 {
        if self.height <= 1 {
            return self.north;
        }
        self.north - (self.north - self.south) * row as f64 / (self.height - 1) as f64
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if !self.bounds().is_valid() {
            return Err(format!(
                "grid bounds must satisfy west < east and south < north, got {:?}",
                self.bounds()
            ));
        }
        Ok(())
    }
}
