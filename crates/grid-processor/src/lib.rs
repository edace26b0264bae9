//! Grid resampling for curvilinear model output.
//!
//! Model fields arrive on their native projected grid with per-cell
//! coordinates. Resamplers map them onto a north-up [`RegularGrid`] so the
//! encoder and tile partitioner can treat pixels as a linear lat/lon raster.
//!
//! # Architecture
//!
//! ```text
//! VectorField (u, v, lat, lon)
//!      │
//!      ▼
//! ResamplerFactory::create(config)
//!      │
//!      ├─► NearestNeighborResampler
//!      │        │
//!      │        ├─► SpatialIndexBuilder::build(source points)
//!      │        │
//!      │        └─► nearest(lat, lon) per target cell, cutoff → valid_mask
//!      │
//!      └─► PassThroughResampler (vertical flip only)
//!               │
//!               ▼
//!          ResampledField
//! ```
//!
//! [`RegularGrid`]: wind_common::RegularGrid

pub mod error;
pub mod factory;
pub mod resample;
pub mod spatial;
pub mod types;

pub use error::{ResampleError, Result};
pub use factory::ResamplerFactory;
pub use resample::{NearestNeighborResampler, PassThroughResampler, Resampler};
pub use spatial::{Neighbor, RTreeIndex, RTreeIndexBuilder, SpatialIndex, SpatialIndexBuilder};
pub use types::{ResampledField, VectorField};
