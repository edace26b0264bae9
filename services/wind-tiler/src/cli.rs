//! Command-line arguments and their translation into a run request.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;

use ingestion::{discover, RunRequest};
use wind_common::time::{parse_hour_list, parse_valid_time};
use wind_common::ResampleMode;

use crate::config::CliOverrides;

#[derive(Parser, Debug)]
#[command(name = "wind-tiler")]
#[command(about = "Encode HRRR 10 m wind into RGBA rasters and map tiles")]
pub struct Args {
    /// Valid time to target (ISO 8601, UTC when no offset); defaults to now
    #[arg(long, conflicts_with_all = ["date", "latest", "input"])]
    pub valid_time: Option<String>,

    /// Model run date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["latest", "input"])]
    pub date: Option<NaiveDate>,

    /// Model cycle hour, used with --date
    #[arg(long, default_value_t = 12, requires = "date")]
    pub cycle: u32,

    /// Use the latest cycle expected to be published
    #[arg(long, conflicts_with = "input")]
    pub latest: bool,

    /// Process GRIB2 files from a local directory instead of downloading
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Forecast hours ("0", "0,3,6", "0-12"); offsets from the valid time
    /// in valid-time mode
    #[arg(long, alias = "fxx", default_value = "0")]
    pub forecast_hours: String,

    /// Output directory
    #[arg(short, long, env = "WIND_OUTPUT_DIR")]
    pub output: PathBuf,

    #[arg(long)]
    pub min_zoom: Option<u32>,

    #[arg(long)]
    pub max_zoom: Option<u32>,

    /// Resampling mode: reproject or pass-through
    #[arg(long)]
    pub resample: Option<String>,

    /// Skip the tile pyramid
    #[arg(long)]
    pub no_tiles: bool,

    /// Compute everything, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Also upload to this bucket
    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Public base URL written into the tile URL template
    #[arg(long, env = "TILE_BASE_URL")]
    pub tile_base_url: Option<String>,

    /// Units processed concurrently
    #[arg(long, default_value_t = 2)]
    pub parallel_units: usize,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            resample: self.resample.as_deref().map(ResampleMode::from_str),
            no_tiles: self.no_tiles,
            local_files: self.input.is_some(),
        }
    }

    /// Translate the mode flags into a request, using `now` for the
    /// defaults.
    pub fn run_request(&self, now: DateTime<Utc>) -> Result<RunRequest> {
        if let Some(dir) = &self.input {
            if !dir.is_dir() {
                bail!("input directory {} does not exist", dir.display());
            }
            let files = discover(dir)?;
            if files.is_empty() {
                bail!("no HRRR GRIB2 files found in {}", dir.display());
            }
            return Ok(RunRequest::LocalFiles(files));
        }

        let hours = parse_hour_list(&self.forecast_hours)
            .with_context(|| format!("invalid --forecast-hours '{}'", self.forecast_hours))?;

        if self.latest {
            return Ok(RunRequest::latest(now, hours));
        }

        if let Some(date) = self.date {
            if self.cycle > 23 {
                bail!("cycle must be 0-23, got {}", self.cycle);
            }
            return Ok(RunRequest::Cycle {
                date,
                cycle_hour: self.cycle,
                leads: hours,
            });
        }

        let base = match &self.valid_time {
            Some(text) => parse_valid_time(text)
                .with_context(|| format!("invalid --valid-time '{}'", text))?,
            None => now,
        };
        Ok(RunRequest::ValidTime {
            base,
            offsets: hours,
        })
    }
}
