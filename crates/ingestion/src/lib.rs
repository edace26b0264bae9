//! HRRR wind ingestion library.
//!
//! Turns 10 m wind from the HRRR model into RGBA-encoded rasters and a
//! web-mercator tile pyramid.
//!
//! # Architecture
//!
//! ```text
//! RunRequest ──plan_units──► WorkUnit* ──► WindPipeline
//!                                              │
//!            WindSource (HRRR over HTTP, local GRIB2 files)
//!                                              │ VectorField
//!            Resampler (nearest neighbour or pass-through)
//!                                              │ ResampledField
//!            EncodedImage ──► TilePartitioner ──► ArtifactSink
//! ```
//!
//! Units are independent: a failed unit is logged and skipped, and a batch
//! only fails when nothing succeeded.

pub mod error;
pub mod grib2;
pub mod hrrr;
pub mod local;
pub mod pipeline;
pub mod source;
pub mod units;

// Re-exports
pub use error::{IngestionError, Result};
pub use grib2::{GribWindDecoder, WindComponent};
pub use hrrr::{HrrrHttpSource, HrrrSourceConfig, HRRR_BASE_URL};
pub use local::{discover, parse_grib_filename, LocalGribFile, LocalGribSource};
pub use pipeline::{
    render_unit, BatchReport, PipelineOptions, UnitArtifacts, UnitReport, WindPipeline,
};
pub use source::{SourcedField, WindSource};
pub use units::{plan_units, RunRequest, WorkUnit, LATEST_CYCLE_DELAY_HOURS};
