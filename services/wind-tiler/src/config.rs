//! Run configuration: file/env layers plus command-line overrides.

use anyhow::{Context, Result};
use std::path::Path;

use wind_common::{ResampleMode, WindConfig};

/// Values given on the command line that take precedence over the
/// configuration file and the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub min_zoom: Option<u32>,
    pub max_zoom: Option<u32>,
    pub resample: Option<ResampleMode>,
    pub no_tiles: bool,
    /// Local-file runs default to pass-through unless `resample` is set.
    pub local_files: bool,
}

/// Build the effective configuration.
///
/// Layering: defaults, then the YAML file if given, then environment
/// variables, then `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<WindConfig> {
    let base = match path {
        Some(path) => WindConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WindConfig::default(),
    };
    let config = apply_overrides(base.with_env_overrides(), overrides);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(mut config: WindConfig, overrides: &CliOverrides) -> WindConfig {
    if let Some(min_zoom) = overrides.min_zoom {
        config.tiles.min_zoom = min_zoom;
    }
    if let Some(max_zoom) = overrides.max_zoom {
        config.tiles.max_zoom = max_zoom;
    }
    if overrides.no_tiles {
        config.tiles.enabled = false;
    }
    match overrides.resample {
        Some(mode) => config.resample.mode = mode,
        None if overrides.local_files => config.resample.mode = ResampleMode::PassThrough,
        None => {}
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_files_default_to_pass_through() {
        let overrides = CliOverrides {
            local_files: true,
            ..Default::default()
        };
        let config = apply_overrides(WindConfig::default(), &overrides);
        assert_eq!(config.resample.mode, ResampleMode::PassThrough);

        let overrides = CliOverrides {
            local_files: true,
            resample: Some(ResampleMode::Reproject),
            ..Default::default()
        };
        let config = apply_overrides(WindConfig::default(), &overrides);
        assert_eq!(config.resample.mode, ResampleMode::Reproject);
    }

    #[test]
    fn test_zoom_and_tile_overrides() {
        let overrides = CliOverrides {
            min_zoom: Some(2),
            max_zoom: Some(4),
            no_tiles: true,
            ..Default::default()
        };
        let config = apply_overrides(WindConfig::default(), &overrides);
        assert_eq!((config.tiles.min_zoom, config.tiles.max_zoom), (2, 4));
        assert!(!config.tiles.enabled);
    }

    #[test]
    fn test_yaml_file_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tiles:\n  tile_size: 128\n  max_zoom: 3").unwrap();

        let overrides = CliOverrides {
            min_zoom: Some(1),
            ..Default::default()
        };
        let config = load_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.tiles.tile_size, 128);
        assert_eq!((config.tiles.min_zoom, config.tiles.max_zoom), (1, 3));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = CliOverrides {
            min_zoom: Some(9),
            max_zoom: Some(2),
            ..Default::default()
        };
        assert!(load_config(None, &overrides).is_err());
    }
}
