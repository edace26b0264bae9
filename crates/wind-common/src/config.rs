//! Configuration shared by the resampler, codec and tile partitioner.

use crate::time::CycleResolverConfig;
use crate::{BoundingBox, RegularGrid, WindError, WindResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Quantization range for wind components.
    pub encoding: EncodingRange,

    /// Regular output raster.
    pub output_grid: RegularGrid,

    /// Resampler selection and cutoff.
    pub resample: ResampleConfig,

    /// Tile pyramid settings.
    pub tiles: TileConfig,

    /// Cycle resolver look-back window.
    pub cycle: CycleResolverConfig,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingRange::default(),
            output_grid: RegularGrid::conus(),
            resample: ResampleConfig::default(),
            tiles: TileConfig::default(),
            cycle: CycleResolverConfig::default(),
        }
    }
}

impl WindConfig {
    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> WindResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: WindConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(min) = env_parse("WIND_MIN") {
            self.encoding.min = min;
        }

        if let Some(max) = env_parse("WIND_MAX") {
            self.encoding.max = max;
        }

        if let Ok(val) = std::env::var("OUTPUT_BOUNDS") {
            match BoundingBox::parse(&val) {
                Ok(bounds) => {
                    let grid = &mut self.output_grid;
                    *grid = RegularGrid::new(bounds, grid.width, grid.height);
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring OUTPUT_BOUNDS"),
            }
        }

        if let Some(width) = env_parse("OUTPUT_WIDTH") {
            self.output_grid.width = width;
        }

        if let Some(height) = env_parse("OUTPUT_HEIGHT") {
            self.output_grid.height = height;
        }

        if let Ok(val) = std::env::var("RESAMPLE_MODE") {
            self.resample.mode = ResampleMode::from_str(&val);
        }

        if let Some(distance) = env_parse("RESAMPLE_MAX_DISTANCE_DEG") {
            self.resample.max_distance_deg = distance;
        }

        if let Some(size) = env_parse("TILE_SIZE") {
            self.tiles.tile_size = size;
        }

        if let Some(zoom) = env_parse("MIN_ZOOM") {
            self.tiles.min_zoom = zoom;
        }

        if let Some(zoom) = env_parse("MAX_ZOOM") {
            self.tiles.max_zoom = zoom;
        }

        if let Ok(val) = std::env::var("TILES_ENABLED") {
            self.tiles.enabled = val.to_lowercase() == "true" || val == "1";
        }

        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> WindResult<()> {
        self.encoding
            .validate()
            .and_then(|_| self.output_grid.validate())
            .and_then(|_| self.resample.validate())
            .and_then(|_| self.tiles.validate())
            .and_then(|_| self.cycle.validate())
            .map_err(WindError::InvalidConfig)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

/// Symmetric value range mapped onto one byte per component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodingRange {
    /// Value mapped to byte 0 (m/s).
    pub min: f32,
    /// Value mapped to byte 255 (m/s).
    pub max: f32,
}

impl Default for EncodingRange {
    fn default() -> Self {
        Self {
            min: -50.0,
            max: 50.0,
        }
    }
}

impl EncodingRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Speed of the extreme corner vector (max, max).
    pub fn max_speed(&self) -> f32 {
        (self.max * self.max + self.max * self.max).sqrt()
    }

    /// Largest decode error over the range: half a quantization step.
    pub fn half_step(&self) -> f32 {
        self.span() / 510.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(format!(
                "encoding range must satisfy min < max, got [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Resampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleMode {
    /// Nearest-neighbour reprojection onto the output grid.
    #[default]
    Reproject,
    /// Keep the native grid, flipped to north-up.
    PassThrough,
}

impl ResampleMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "pass-through" | "passthrough" | "none" | "legacy" => Self::PassThrough,
            _ => Self::Reproject,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reproject => "reproject",
            Self::PassThrough => "pass-through",
        }
    }
}

impl std::fmt::Display for ResampleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    pub mode: ResampleMode,

    /// Nearest neighbours farther than this (planar degrees) are invalid.
    pub max_distance_deg: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            mode: ResampleMode::Reproject,
            max_distance_deg: 0.15,
        }
    }
}

impl ResampleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_distance_deg > 0.0) {
            return Err(format!(
                "max_distance_deg must be > 0, got {}",
                self.max_distance_deg
            ));
        }
        Ok(())
    }
}

/// Tile pyramid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Whether to generate tiles at all.
    pub enabled: bool,

    /// Edge length of every tile in pixels.
    pub tile_size: u32,

    pub min_zoom: u32,

    pub max_zoom: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tile_size: 256,
            min_zoom: 0,
            max_zoom: 6,
        }
    }
}

impl TileConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("tile_size must be > 0".to_string());
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom ({}) must not exceed max_zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.max_zoom > 22 {
            return Err(format!("max_zoom must be <= 22, got {}", self.max_zoom));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WindConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encoding.min, -50.0);
        assert_eq!(config.encoding.max, 50.0);
        assert_eq!(config.tiles.tile_size, 256);
        assert_eq!(config.resample.max_distance_deg, 0.15);
    }

    #[test]
    fn test_invalid_zoom_range() {
        let mut config = WindConfig::default();
        config.tiles.min_zoom = 7;
        config.tiles.max_zoom = 3;
        assert!(matches!(config.validate(), Err(WindError::InvalidConfig(_))));
    }

    #[test]
    fn test_resample_mode_from_str() {
        assert_eq!(ResampleMode::from_str("PASS_THROUGH"), ResampleMode::PassThrough);
        assert_eq!(ResampleMode::from_str("legacy"), ResampleMode::PassThrough);
        assert_eq!(ResampleMode::from_str("reproject"), ResampleMode::Reproject);
        assert_eq!(ResampleMode::from_str("anything"), ResampleMode::Reproject);
    }

    #[test]
    fn test_max_speed() {
        let range = EncodingRange::default();
        assert!((range.max_speed() - 70.710_68).abs() < 1e-3);
    }
}
