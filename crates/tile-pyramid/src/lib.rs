//! Web Mercator tile pyramids cut from one encoded wind raster.
//!
//! ```text
//! EncodedImage + bounds
//!        │
//!        ▼
//!   plan()  ──►  TileWindow per (z, x, y) overlapping the bounds
//!        │
//!        ▼
//!   render (rayon)  ──►  crop + bilinear resize to tile_size²
//!        │
//!        ▼
//!   Vec<Tile>  ──►  to_png()
//! ```
//!
//! Pixel windows are derived with a linear mapping between the raster's
//! geographic bounds and its pixel grid, i.e. the raster is addressed as
//! equirectangular while tile edges come from spherical Mercator.

pub mod error;
pub mod partition;
pub mod window;

pub use error::{Result, TileError};
pub use partition::{Tile, TilePartitioner};
pub use window::{pixel_window, PixelWindow, TileWindow};
