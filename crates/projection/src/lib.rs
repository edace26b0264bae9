//! Map projections for native model grids.
//!
//! Only the Lambert Conformal Conic projection used by HRRR is needed to
//! recover per-cell coordinates of the source grid.

pub mod lambert;

pub use lambert::{normalize_longitude, LambertConformal, LambertParams, ProjectionError};
