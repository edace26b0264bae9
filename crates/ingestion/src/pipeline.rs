//! Batch pipeline: fetch → resample → encode → tile → publish.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use grid_processor::{Resampler, ResamplerFactory};
use storage::ArtifactSink;
use tile_pyramid::TilePartitioner;
use wind_codec::EncodedImage;
use wind_common::metadata::{BatchMetadata, TileManifest, UnitMetadata, PROJECTION_WGS84};
use wind_common::naming::{batch_metadata_path, tile_url_template};
use wind_common::{WindConfig, WindError};

use crate::error::{IngestionError, Result};
use crate::source::{SourcedField, WindSource};
use crate::units::WorkUnit;

/// Projection label for rasters left on the native model grid.
pub const PROJECTION_NATIVE: &str = "Lambert Conformal (native HRRR grid)";

/// Metadata warning for rasters that were not reprojected.
pub const NOT_REPROJECTED_WARNING: &str = "Legacy mode: not reprojected to WGS84";

/// Run-level switches.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Run the computation but write nothing.
    pub dry_run: bool,
    /// Units processed concurrently.
    pub parallel_units: usize,
    /// Public base URL used in the tile URL template.
    pub tile_base_url: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            parallel_units: 2,
            tile_base_url: None,
        }
    }
}

/// Everything produced for one unit, held in memory until published.
#[derive(Debug, Clone)]
pub struct UnitArtifacts {
    pub unit: WorkUnit,
    pub metadata: UnitMetadata,
    pub image_png: Bytes,
    /// (storage path, PNG) per tile
    pub tiles: Vec<(String, Bytes)>,
}

impl UnitArtifacts {
    pub fn artifact_count(&self) -> usize {
        2 + self.tiles.len()
    }

    pub fn byte_count(&self) -> u64 {
        self.image_png.len() as u64 + self.tiles.iter().map(|(_, b)| b.len() as u64).sum::<u64>()
    }
}

/// Outcome of one processed unit.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: WorkUnit,
    pub metadata: UnitMetadata,
    pub tiles: usize,
    pub bytes: u64,
    pub published: bool,
}

/// Outcome of a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub succeeded: Vec<UnitReport>,
    pub skipped: usize,
    pub batch_metadata: Option<BatchMetadata>,
    /// False on dry runs and when writing the batch record failed.
    pub batch_metadata_published: bool,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.skipped
    }
}

/// Wires a source, a resampler and a sink into the wind tile pipeline.
pub struct WindPipeline {
    source: Arc<dyn WindSource>,
    resampler: Arc<dyn Resampler>,
    sink: Arc<dyn ArtifactSink>,
    partitioner: Option<TilePartitioner>,
    config: Arc<WindConfig>,
    options: PipelineOptions,
}

impl WindPipeline {
    /// Build a pipeline, failing fast on invalid configuration or a missing
    /// resampling capability.
    pub fn new(
        source: Arc<dyn WindSource>,
        sink: Arc<dyn ArtifactSink>,
        factory: &ResamplerFactory,
        config: WindConfig,
        options: PipelineOptions,
    ) -> Result<Self> {
        config.validate()?;
        if options.parallel_units == 0 {
            return Err(WindError::InvalidConfig("parallel_units must be at least 1".into()).into());
        }

        let resampler = factory.create(&config.resample)?;
        let partitioner = if config.tiles.enabled {
            Some(TilePartitioner::from_config(&config.tiles)?)
        } else {
            None
        };

        info!(
            source = source.name(),
            sink = sink.name(),
            resampler = resampler.name(),
            tiles = partitioner.is_some(),
            dry_run = options.dry_run,
            "Pipeline ready"
        );

        Ok(Self {
            source,
            resampler,
            sink,
            partitioner,
            config: Arc::new(config),
            options,
        })
    }

    pub fn config(&self) -> &WindConfig {
        &self.config
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Fetch, compute and (unless dry-running) publish one unit.
    ///
    /// All artifacts are built before the first write, so a unit that fails
    /// to compute publishes nothing.
    #[instrument(skip(self), fields(unit = %unit.key))]
    pub async fn process_unit(&self, unit: &WorkUnit) -> Result<UnitReport> {
        let started = Instant::now();
        let sourced = self.source.fetch(&unit.selection).await?;

        let resampler = self.resampler.clone();
        let partitioner = self.partitioner;
        let config = self.config.clone();
        let unit_copy = *unit;
        let artifacts = tokio::task::spawn_blocking(move || {
            render_unit(
                resampler.as_ref(),
                partitioner.as_ref(),
                &config,
                &unit_copy,
                sourced,
            )
        })
        .await
        .map_err(|e| IngestionError::Task(e.to_string()))??;

        let published = if self.options.dry_run {
            info!(
                artifacts = artifacts.artifact_count(),
                "Dry run: not publishing"
            );
            false
        } else {
            self.publish(&artifacts).await?;
            true
        };

        info!(
            tiles = artifacts.tiles.len(),
            bytes = artifacts.byte_count(),
            valid_fraction = artifacts.metadata.valid_fraction,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Unit complete"
        );

        Ok(UnitReport {
            unit: *unit,
            tiles: artifacts.tiles.len(),
            bytes: artifacts.byte_count(),
            metadata: artifacts.metadata,
            published,
        })
    }

    async fn publish(&self, artifacts: &UnitArtifacts) -> Result<()> {
        let key = &artifacts.unit.key;
        self.sink
            .put(&key.image_path(), artifacts.image_png.clone())
            .await?;
        self.sink
            .put(
                &key.metadata_path(),
                Bytes::from(serde_json::to_vec_pretty(&artifacts.metadata)?),
            )
            .await?;
        for (path, png) in &artifacts.tiles {
            self.sink.put(path, png.clone()).await?;
        }
        Ok(())
    }

    /// Process every unit, skipping failures, then publish batch metadata.
    ///
    /// Fails with [`IngestionError::EmptyBatch`] only when no unit succeeded.
    #[instrument(skip_all, fields(units = units.len()))]
    pub async fn run_batch(&self, units: Vec<Result<WorkUnit>>) -> Result<BatchReport> {
        let attempted = units.len();

        let outcomes: Vec<Result<UnitReport>> = stream::iter(units)
            .map(|planned| async move {
                match planned {
                    Ok(unit) => self.process_unit(&unit).await,
                    Err(e) => Err(e),
                }
            })
            .buffer_unordered(self.options.parallel_units)
            .collect()
            .await;

        let mut succeeded = Vec::new();
        let mut skipped = 0;
        for outcome in outcomes {
            match outcome {
                Ok(report) => succeeded.push(report),
                Err(e) => {
                    warn!(error = %e, "Skipping unit");
                    skipped += 1;
                }
            }
        }
        succeeded.sort_by_key(|r| r.unit.key);

        if succeeded.is_empty() {
            error!(attempted, "No unit succeeded");
            return Err(IngestionError::EmptyBatch { attempted });
        }

        let batch_metadata = self.batch_metadata(&succeeded);
        let mut batch_metadata_published = false;
        if let Some(metadata) = &batch_metadata {
            if !self.options.dry_run {
                // Units are already published; a missing batch record is not fatal.
                match self.publish_batch_metadata(metadata).await {
                    Ok(()) => batch_metadata_published = true,
                    Err(e) => error!(
                        error = %e,
                        path = %batch_metadata_path(),
                        "Failed to publish batch metadata"
                    ),
                }
            }
        }

        info!(succeeded = succeeded.len(), skipped, "Batch complete");

        Ok(BatchReport {
            succeeded,
            skipped,
            batch_metadata,
            batch_metadata_published,
        })
    }

    async fn publish_batch_metadata(&self, metadata: &BatchMetadata) -> Result<()> {
        let body = Bytes::from(serde_json::to_vec_pretty(metadata)?);
        self.sink.put(&batch_metadata_path(), body).await?;
        Ok(())
    }

    fn batch_metadata(&self, succeeded: &[UnitReport]) -> Option<BatchMetadata> {
        let latest = succeeded.last()?;
        let timestamp = latest.unit.run.to_string();
        let hours: Vec<u32> = succeeded.iter().map(|r| r.unit.key.forecast_hour).collect();

        let mut metadata = BatchMetadata::new(latest.metadata.clone(), &hours, timestamp.clone());
        if let Some(tiles) = &self.partitioner {
            let (min_zoom, max_zoom) = tiles.zoom_range();
            metadata = metadata.with_tiles(TileManifest {
                url_template: tile_url_template(self.options.tile_base_url.as_deref(), &timestamp),
                tile_size: tiles.tile_size(),
                min_zoom,
                max_zoom,
            });
        }
        Some(metadata)
    }
}

/// The CPU-bound part of a unit: resample, encode, tile, build metadata.
pub fn render_unit(
    resampler: &dyn Resampler,
    partitioner: Option<&TilePartitioner>,
    config: &WindConfig,
    unit: &WorkUnit,
    sourced: SourcedField,
) -> Result<UnitArtifacts> {
    let SourcedField { field, source_id } = sourced;

    let resampled = resampler.resample(&field, &config.output_grid)?;
    let valid_fraction = resampled.valid_fraction();
    info!(
        width = resampled.width,
        height = resampled.height,
        valid_pct = valid_fraction * 100.0,
        resampler = resampler.name(),
        "Resampled field"
    );

    let image = EncodedImage::encode(
        resampled.width,
        resampled.height,
        &resampled.u,
        &resampled.v,
        Some(&resampled.valid_mask),
        &config.encoding,
    )?;
    let image_png = Bytes::from(image.to_png()?);

    let tiles = match partitioner {
        Some(partitioner) => partitioner
            .partition(&image, &resampled.bounds)?
            .into_par_iter()
            .map(|tile| Ok((unit.tile_path(&tile.coord), Bytes::from(tile.to_png()?))))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let selection = &unit.selection;
    let metadata = UnitMetadata {
        source: source_id,
        cycle: selection.cycle_time.format("%Y-%m-%d %H:%M").to_string(),
        forecast_hour: selection.lead_hours,
        valid_time: selection.valid_time().format("%Y-%m-%d %H:%M UTC").to_string(),
        shape: [field.height(), field.width()],
        image_shape: [resampled.height, resampled.width],
        wind_encoding: config.encoding.into(),
        bounds: resampled.bounds.into(),
        projection: if resampled.reprojected {
            PROJECTION_WGS84.to_string()
        } else {
            PROJECTION_NATIVE.to_string()
        },
        reprojected: resampled.reprojected,
        valid_fraction,
        warning: (!resampled.reprojected).then(|| NOT_REPROJECTED_WARNING.to_string()),
    };

    Ok(UnitArtifacts {
        unit: *unit,
        metadata,
        image_png,
        tiles,
    })
}
