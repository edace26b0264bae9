//! Lambert Conformal Conic projection.
//!
//! HRRR publishes its CONUS fields on a Lambert Conformal grid. The GRIB
//! messages carry only the grid definition, so per-cell coordinates are
//! recovered here from the first grid point, the orientation meridian (LoV),
//! the standard parallels and the grid spacing.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Earth radius used by NCEP for Lambert grids (meters).
const EARTH_RADIUS: f64 = 6_371_229.0;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid projection parameters: {0}")]
    InvalidParameters(String),
}

/// Grid definition in GRIB2 template 3.30 terms, all angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertParams {
    /// Latitude of the first grid point
    pub lat1: f64,
    /// Longitude of the first grid point
    pub lon1: f64,
    /// Orientation meridian
    pub lov: f64,
    pub latin1: f64,
    pub latin2: f64,
    /// Grid spacing in meters
    pub dx: f64,
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
}

impl LambertParams {
    /// HRRR CONUS grid: 1799 x 1059 at 3 km, tangent at 38.5N.
    pub fn hrrr() -> Self {
        Self {
            lat1: 21.138123,
            lon1: -122.719528,
            lov: -97.5,
            latin1: 38.5,
            latin2: 38.5,
            dx: 3000.0,
            dy: 3000.0,
            nx: 1799,
            ny: 1059,
        }
    }
}

/// Lambert Conformal Conic projection bound to a specific grid.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    params: LambertParams,
    /// Central meridian in radians
    lon0: f64,
    /// Cone constant
    n: f64,
    f: f64,
    /// Rho at the first grid point
    rho0: f64,
    /// Projected coordinates of the first grid point
    x0: f64,
    y0: f64,
}

impl LambertConformal {
    pub fn new(params: LambertParams) -> Result<Self, ProjectionError> {
        if params.nx == 0 || params.ny == 0 {
            return Err(ProjectionError::InvalidParameters(format!(
                "grid must be non-empty, got {}x{}",
                params.nx, params.ny
            )));
        }
        if params.dx <= 0.0 || params.dy <= 0.0 {
            return Err(ProjectionError::InvalidParameters(format!(
                "grid spacing must be positive, got dx={} dy={}",
                params.dx, params.dy
            )));
        }

        let n = cone_constant(params.latin1.to_radians(), params.latin2.to_radians());
        if n.abs() < 1e-12 || !n.is_finite() {
            return Err(ProjectionError::InvalidParameters(
                "standard parallels produce a degenerate cone".to_string(),
            ));
        }

        Ok(Self::build(params))
    }

    fn build(params: LambertParams) -> Self {
        let lat1 = params.lat1.to_radians();
        let latin1 = params.latin1.to_radians();
        let lon0 = params.lov.to_radians();
        let n = cone_constant(latin1, params.latin2.to_radians());

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = EARTH_RADIUS * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * wrap_radians(params.lon1.to_radians() - lon0);
        let x0 = rho0 * theta0.sin();
        let y0 = rho0 - rho0 * theta0.cos();

        Self {
            params,
            lon0,
            n,
            f,
            rho0,
            x0,
            y0,
        }
    }

    /// Projection for the operational HRRR CONUS grid.
    pub fn hrrr() -> Self {
        Self::build(LambertParams::hrrr())
    }

    pub fn params(&self) -> &LambertParams {
        &self.params
    }

    /// Grid dimensions (nx, ny).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.params.nx, self.params.ny)
    }

    /// Geographic (lat, lon) in degrees to fractional grid indices (i, j).
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = wrap_radians(lon_deg.to_radians() - self.lon0);

        let rho = EARTH_RADIUS * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        ((x - self.x0) / self.params.dx, (y - self.y0) / self.params.dy)
    }

    /// Grid indices (i, j) to geographic (lat, lon) in degrees.
    ///
    /// Longitudes are in `[-180, 180)`.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.x0 + i * self.params.dx;
        let y = self.y0 + j * self.params.dy;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };
        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((EARTH_RADIUS * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat.to_degrees(), normalize_longitude(lon.to_degrees()))
    }

    /// Coordinates of every cell in row-major order, row `j` = grid row `j`.
    ///
    /// Returns `(lats, lons)`, each `nx * ny` long.
    pub fn coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        let (nx, ny) = self.dimensions();
        let rows: Vec<(Vec<f64>, Vec<f64>)> = (0..ny)
            .into_par_iter()
            .map(|j| {
                let mut lats = Vec::with_capacity(nx);
                let mut lons = Vec::with_capacity(nx);
                for i in 0..nx {
                    let (lat, lon) = self.grid_to_geo(i as f64, j as f64);
                    lats.push(lat);
                    lons.push(lon);
                }
                (lats, lons)
            })
            .collect();

        let mut lats = Vec::with_capacity(nx * ny);
        let mut lons = Vec::with_capacity(nx * ny);
        for (row_lats, row_lons) in rows {
            lats.extend(row_lats);
            lons.extend(row_lons);
        }
        (lats, lons)
    }

    /// Check if a geographic point falls inside the grid.
    pub fn contains(&self, lat_deg: f64, lon_deg: f64) -> bool {
        let (i, j) = self.geo_to_grid(lat_deg, lon_deg);
        let (nx, ny) = self.dimensions();
        i >= 0.0 && i < nx as f64 && j >= 0.0 && j < ny as f64
    }
}

/// Cone constant for one (tangent) or two (secant) standard parallels.
fn cone_constant(latin1: f64, latin2: f64) -> f64 {
    if (latin1 - latin2).abs() < 1e-10 {
        latin1.sin()
    } else {
        let ln_ratio = (latin1.cos() / latin2.cos()).ln();
        let tan_ratio = ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
        ln_ratio / tan_ratio
    }
}

fn wrap_radians(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Map a longitude in degrees onto `[-180, 180)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
