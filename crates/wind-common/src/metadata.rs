//! Metadata records published alongside encoded wind images.

use crate::{BoundingBox, EncodingRange};
use serde::{Deserialize, Serialize};

pub const PROJECTION_WGS84: &str = "EPSG:4326 (WGS84)";

/// Channel semantics of an encoded wind image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindEncoding {
    pub min: f32,
    pub max: f32,
    pub unit: String,
    pub r_channel: String,
    pub g_channel: String,
    pub b_channel: String,
    pub a_channel: String,
    pub encoding: String,
}

impl From<EncodingRange> for WindEncoding {
    fn from(range: EncodingRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            unit: "m/s".to_string(),
            r_channel: "U component (east-west)".to_string(),
            g_channel: "V component (north-south)".to_string(),
            b_channel: "magnitude".to_string(),
            a_channel: "validity (255 = valid, 0 = no data)".to_string(),
            encoding: format!(
                "128 = 0 m/s, 0 = {} m/s, 255 = +{} m/s",
                range.min, range.max
            ),
        }
    }
}

/// Geographic extent in named-edge form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl From<BoundingBox> for Bounds {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            west: bbox.min_x,
            east: bbox.max_x,
            south: bbox.min_y,
            north: bbox.max_y,
        }
    }
}

impl From<Bounds> for BoundingBox {
    fn from(bounds: Bounds) -> Self {
        BoundingBox::new(bounds.west, bounds.south, bounds.east, bounds.north)
    }
}

/// Metadata for one encoded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMetadata {
    /// Source identity, e.g. the GRIB file or URL.
    pub source: String,
    /// Model cycle, "YYYY-MM-DD HH:00".
    pub cycle: String,
    pub forecast_hour: u32,
    /// "YYYY-MM-DD HH:MM UTC"
    pub valid_time: String,
    /// Source field shape, [rows, cols].
    pub shape: [usize; 2],
    /// Encoded image shape, [rows, cols].
    pub image_shape: [usize; 2],
    pub wind_encoding: WindEncoding,
    pub bounds: Bounds,
    pub projection: String,
    pub reprojected: bool,
    /// Fraction of output pixels carrying data.
    pub valid_fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
}

/// Tile pyramid description for map clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileManifest {
    pub url_template: String,
    pub tile_size: u32,
    pub min_zoom: u32,
    pub max_zoom: u32,
}

/// Batch-level record: the latest unit's metadata plus the tile layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    #[serde(flatten)]
    pub latest: UnitMetadata,
    /// Processed forecast hours, zero-padded ("00", "01", ...).
    pub forecast_hours: Vec<String>,
    /// Run timestamp, "YYYYMMDDTCCz".
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tiles: Option<TileManifest>,
}

impl BatchMetadata {
    pub fn new(latest: UnitMetadata, forecast_hours: &[u32], timestamp: String) -> Self {
        let mut hours: Vec<u32> = forecast_hours.to_vec();
        hours.sort_unstable();
        hours.dedup();
        Self {
            latest,
            forecast_hours: hours.iter().map(|h| format!("{:02}", h)).collect(),
            timestamp,
            tiles: None,
        }
    }

    pub fn with_tiles(mut self, tiles: TileManifest) -> Self {
        self.tiles = Some(tiles);
        self
    }
}
