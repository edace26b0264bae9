//! Synthetic wind fields.
//!
//! Every generator returns a [`SyntheticField`] whose arrays are row-major
//! with row 0 at the southern edge, matching decoded GRIB scan order.

/// Raw arrays for one synthetic field.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticField {
    pub width: usize,
    pub height: usize,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl SyntheticField {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set (u, v) of one cell, addressed by source row and column.
    pub fn set(&mut self, row: usize, col: usize, u: f32, v: f32) {
        let idx = row * self.width + col;
        self.u[idx] = u;
        self.v[idx] = v;
    }
}

/// Coordinates of an axis-aligned source grid.
///
/// Row 0 sits at `south`, column 0 at `west`, spaced `spacing` degrees.
pub fn regular_coordinates(
    west: f64,
    south: f64,
    spacing: f64,
    width: usize,
    height: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut lats = Vec::with_capacity(width * height);
    let mut lons = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            lats.push(south + row as f64 * spacing);
            lons.push(west + col as f64 * spacing);
        }
    }
    (lats, lons)
}

/// A constant wind over a regular source grid.
pub fn uniform_field(
    west: f64,
    south: f64,
    spacing: f64,
    width: usize,
    height: usize,
    u: f32,
    v: f32,
) -> SyntheticField {
    let (lats, lons) = regular_coordinates(west, south, spacing, width, height);
    SyntheticField {
        width,
        height,
        u: vec![u; width * height],
        v: vec![v; width * height],
        lats,
        lons,
    }
}

/// Westerlies strengthening to the north: `u` grows linearly with row from
/// `-max_speed` to `+max_speed`, `v` is zero.
pub fn zonal_shear_field(
    west: f64,
    south: f64,
    spacing: f64,
    width: usize,
    height: usize,
    max_speed: f32,
) -> SyntheticField {
    let mut field = uniform_field(west, south, spacing, width, height, 0.0, 0.0);
    let span = (height.max(2) - 1) as f32;
    for row in 0..height {
        let u = -max_speed + 2.0 * max_speed * row as f32 / span;
        for col in 0..width {
            field.set(row, col, u, 0.0);
        }
    }
    field
}

/// Counter-clockwise rotation about the grid centre; speed grows linearly
/// with distance and reaches `max_speed` at the corners.
pub fn vortex_field(
    west: f64,
    south: f64,
    spacing: f64,
    width: usize,
    height: usize,
    max_speed: f32,
) -> SyntheticField {
    let mut field = uniform_field(west, south, spacing, width, height, 0.0, 0.0);
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let scale = max_speed / max_dist;
            field.set(row, col, -dy * scale, dx * scale);
        }
    }
    field
}

/// A 3x3 patch at 0.03 degree spacing anchored at (38N, 100W).
///
/// `u` is -10, 0, +10 m/s from west to east; `v` is zero everywhere.
pub fn three_by_three_patch() -> SyntheticField {
    let mut field = uniform_field(-100.0, 38.0, 0.03, 3, 3, 0.0, 0.0);
    for row in 0..3 {
        for (col, u) in [-10.0, 0.0, 10.0].into_iter().enumerate() {
            field.set(row, col, u, 0.0);
        }
    }
    field
}

/// A 3x3 patch at 0.2 degree spacing anchored at (38N, 100W) with `u`
/// numbered 1..=9 row-major from the south-west corner and `v` zero.
///
/// Rows read `[1, 2, 3]` (south), `[4, 5, 6]`, `[7, 8, 9]` (north), so `u`
/// grows both eastwards and northwards.
pub fn numbered_patch() -> SyntheticField {
    let mut field = uniform_field(-100.0, 38.0, 0.2, 3, 3, 0.0, 0.0);
    for (i, u) in field.u.iter_mut().enumerate() {
        *u = (i + 1) as f32;
    }
    field
}
