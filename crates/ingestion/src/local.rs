//! GRIB2 files already on disk.
//!
//! Files follow the HRRR naming `hrrr.YYYYMMDD.tCCz.wrfsfcfLL.grib2` or the
//! short form `hrrr.YYYYMMDD.tCCz.fLL.grib2`, optionally gzip-compressed
//! (`.gz`). Each file is one unit keyed by its name.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use wind_common::{ArtifactKey, CycleSelection};

use crate::error::{IngestionError, Result};
use crate::grib2::GribWindDecoder;
use crate::source::{SourcedField, WindSource};

/// Parse a GRIB2 file name into its (date, cycle, lead) key.
pub fn parse_grib_filename(name: &str) -> Option<ArtifactKey> {
    let name = name.strip_suffix(".gz").unwrap_or(name);
    let stem = name.strip_suffix(".grib2")?;
    let mut parts = stem.split('.');

    if parts.next()? != "hrrr" {
        return None;
    }
    let date = parts.next()?;
    let cycle = parts.next()?;
    let lead = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let cycle = two_digits(cycle.strip_prefix('t')?.strip_suffix('z')?)?;
    let lead = lead
        .strip_prefix("wrfsfcf")
        .or_else(|| lead.strip_prefix('f'))
        .and_then(two_digits)?;

    if cycle > 23 {
        return None;
    }
    Some(ArtifactKey::new(date, cycle, lead))
}

fn two_digits(s: &str) -> Option<u32> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A GRIB2 file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalGribFile {
    pub path: PathBuf,
    pub key: ArtifactKey,
}

impl LocalGribFile {
    pub fn selection(&self) -> Result<CycleSelection> {
        Ok(CycleSelection::from_date(
            self.key.date,
            self.key.cycle_hour,
            self.key.forecast_hour,
        )?)
    }
}

/// List parseable GRIB2 files directly inside `dir`, sorted by name.
pub fn discover(dir: &Path) -> Result<Vec<LocalGribFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        match parse_grib_filename(&name) {
            Some(key) => files.push(LocalGribFile {
                path: entry.path().to_path_buf(),
                key,
            }),
            None if name.contains(".grib2") => {
                warn!(file = %name, "Could not parse filename, skipping");
            }
            None => {}
        }
    }

    info!(dir = %dir.display(), count = files.len(), "Discovered GRIB2 files");
    Ok(files)
}

/// Serves fields from a set of local files, looked up by cycle and lead.
pub struct LocalGribSource {
    files: BTreeMap<(NaiveDate, u32, u32), PathBuf>,
    decoder: Arc<GribWindDecoder>,
}

impl LocalGribSource {
    pub fn new(files: &[LocalGribFile], decoder: Arc<GribWindDecoder>) -> Self {
        let files = files
            .iter()
            .map(|f| {
                (
                    (f.key.date, f.key.cycle_hour, f.key.forecast_hour),
                    f.path.clone(),
                )
            })
            .collect();
        Self { files, decoder }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl WindSource for LocalGribSource {
    fn name(&self) -> &str {
        "local-grib"
    }

    #[instrument(skip(self), fields(cycle = %selection.cycle_time, lead = selection.lead_hours))]
    async fn fetch(&self, selection: &CycleSelection) -> Result<SourcedField> {
        let lookup = (
            selection.cycle_date(),
            selection.cycle_hour(),
            selection.lead_hours,
        );
        let path = self.files.get(&lookup).cloned().ok_or_else(|| {
            IngestionError::NotAvailable(ArtifactKey::from_selection(selection).basename())
        })?;

        let data = tokio::fs::read(&path).await?;
        debug!(path = %path.display(), size = data.len(), "Read GRIB2 file");

        let decoder = self.decoder.clone();
        let field = tokio::task::spawn_blocking(move || decoder.decode(&data))
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))??;

        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(SourcedField { field, source_id })
    }
}
