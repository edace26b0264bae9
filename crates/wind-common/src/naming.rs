//! Artifact naming and storage layout.
//!
//! Downstream consumers locate artifacts by these names, so the formats
//! here are fixed: `wind_{YYYYMMDD}_t{CC}z_f{LL}.png` for images and
//! `{YYYYMMDD}T{CC}z/{LL}/{z}/{x}/{y}.png` for tiles.

use crate::time::CycleSelection;
use crate::TileCoord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Prefix for full-resolution images and their metadata.
pub const IMAGE_PREFIX: &str = "wind-tiles";

/// Prefix for tile pyramids and the batch metadata record.
pub const TILE_PREFIX: &str = "wind-particles";

/// Name of the batch-level metadata record under [`TILE_PREFIX`].
pub const BATCH_METADATA_NAME: &str = "metadata.json";

/// Identity of one output unit: run date, cycle hour and forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub date: NaiveDate,
    pub cycle_hour: u32,
    pub forecast_hour: u32,
}

impl ArtifactKey {
    pub fn new(date: NaiveDate, cycle_hour: u32, forecast_hour: u32) -> Self {
        Self {
            date,
            cycle_hour,
            forecast_hour,
        }
    }

    /// Key naming a selection by its own cycle and lead.
    pub fn from_selection(selection: &CycleSelection) -> Self {
        Self::new(
            selection.cycle_date(),
            selection.cycle_hour(),
            selection.lead_hours,
        )
    }

    /// `{YYYYMMDD}_t{CC}z_f{LL}`
    pub fn basename(&self) -> String {
        format!(
            "{}_t{:02}z_f{:02}",
            self.date.format("%Y%m%d"),
            self.cycle_hour,
            self.forecast_hour
        )
    }

    pub fn image_name(&self) -> String {
        format!("wind_{}.png", self.basename())
    }

    pub fn metadata_name(&self) -> String {
        format!("wind_{}.json", self.basename())
    }

    /// Directory holding this run's images: `wind-tiles/{YYYY-MM-DD}/{CC}Z`.
    pub fn image_dir(&self) -> String {
        format!(
            "{}/{}/{:02}Z",
            IMAGE_PREFIX,
            self.date.format("%Y-%m-%d"),
            self.cycle_hour
        )
    }

    pub fn image_path(&self) -> String {
        format!("{}/{}", self.image_dir(), self.image_name())
    }

    pub fn metadata_path(&self) -> String {
        format!("{}/{}", self.image_dir(), self.metadata_name())
    }

    pub fn run(&self) -> RunStamp {
        RunStamp::new(self.date, self.cycle_hour)
    }

    /// Run timestamp of this key's own cycle: `{YYYYMMDD}T{CC}z`.
    pub fn run_timestamp(&self) -> String {
        self.run().to_string()
    }

    /// Root of this unit's pyramid under its own run: `{YYYYMMDD}T{CC}z/{LL}`.
    pub fn tile_root(&self) -> String {
        self.run().tile_root(self.forecast_hour)
    }

    /// Full storage path of one tile under this key's own run.
    pub fn tile_path(&self, coord: &TileCoord) -> String {
        self.run().tile_path(self.forecast_hour, coord)
    }
}

/// Directory stamp grouping the tile pyramids of one batch.
///
/// Every forecast of a batch is published under a single stamp so that one
/// URL template with a `{forecast}` placeholder reaches all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunStamp {
    pub date: NaiveDate,
    pub cycle_hour: u32,
}

impl RunStamp {
    pub fn new(date: NaiveDate, cycle_hour: u32) -> Self {
        Self { date, cycle_hour }
    }

    /// `{YYYYMMDD}T{CC}z/{LL}`
    pub fn tile_root(&self, forecast_hour: u32) -> String {
        format!("{}/{:02}", self, forecast_hour)
    }

    pub fn tile_path(&self, forecast_hour: u32, coord: &TileCoord) -> String {
        format!(
            "{}/{}/{}",
            TILE_PREFIX,
            self.tile_root(forecast_hour),
            coord.path()
        )
    }
}

impl std::fmt::Display for RunStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}T{:02}z", self.date.format("%Y%m%d"), self.cycle_hour)
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.basename())
    }
}

/// Storage path of the batch metadata record.
pub fn batch_metadata_path() -> String {
    format!("{}/{}", TILE_PREFIX, BATCH_METADATA_NAME)
}

/// URL template for tiles of a run, with `{forecast}`, `{z}`, `{x}` and `{y}`
/// placeholders left for the client.
pub fn tile_url_template(base_url: Option<&str>, run_timestamp: &str) -> String {
    let path = format!("{}/{}/{{forecast}}/{{z}}/{{x}}/{{y}}.png", TILE_PREFIX, run_timestamp);
    match base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), path),
        None => path,
    }
}
