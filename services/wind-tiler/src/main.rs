//! HRRR wind tile generator.
//!
//! Resolves model cycles, downloads (or reads) 10 m wind, resamples it to a
//! north-up lat/lon raster, encodes it as RGBA and cuts a web-mercator tile
//! pyramid. Artifacts go to a local directory and optionally to S3.

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use grid_processor::ResamplerFactory;
use ingestion::{
    plan_units, GribWindDecoder, HrrrHttpSource, HrrrSourceConfig, IngestionError,
    LocalGribSource, PipelineOptions, RunRequest, WindPipeline, WindSource,
};
use storage::{ArtifactSink, FanoutSink, FilesystemSink, ObjectStorage, ObjectStorageConfig};
use wind_common::CycleResolver;

use cli::Args;
use config::load_config;

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    info!("Starting wind tiler");

    let config = load_config(args.config.as_deref(), &args.overrides())?;
    info!(
        resample = %config.resample.mode,
        tiles = config.tiles.enabled,
        min_zoom = config.tiles.min_zoom,
        max_zoom = config.tiles.max_zoom,
        "Loaded configuration"
    );

    let request = args.run_request(Utc::now())?;
    let decoder = Arc::new(GribWindDecoder::hrrr());
    let source: Arc<dyn WindSource> = match &request {
        RunRequest::LocalFiles(files) => {
            info!(files = files.len(), "Mode: local GRIB2 files");
            Arc::new(LocalGribSource::new(files, decoder))
        }
        _ => {
            info!("Mode: HRRR download");
            Arc::new(HrrrHttpSource::new(HrrrSourceConfig::from_env(), decoder)?)
        }
    };

    let sink = build_sink(&args)?;
    let options = PipelineOptions {
        dry_run: args.dry_run,
        parallel_units: args.parallel_units,
        tile_base_url: args.tile_base_url.clone(),
    };

    let resolver = CycleResolver::new(config.cycle);
    let pipeline = WindPipeline::new(
        source,
        sink,
        &ResamplerFactory::with_rtree(),
        config,
        options,
    )?;

    let units = plan_units(&request, &resolver);
    match pipeline.run_batch(units).await {
        Ok(report) => {
            let tiles: usize = report.succeeded.iter().map(|u| u.tiles).sum();
            info!(
                succeeded = report.succeeded.len(),
                skipped = report.skipped,
                tiles,
                output = %args.output.display(),
                "Wind tiles complete"
            );
            Ok(())
        }
        Err(e @ IngestionError::EmptyBatch { .. }) => Err(e).context("nothing was produced"),
        Err(e) => Err(e.into()),
    }
}

/// Local directory, plus S3 when a bucket is configured.
fn build_sink(args: &Args) -> Result<Arc<dyn ArtifactSink>> {
    let local: Arc<dyn ArtifactSink> = Arc::new(FilesystemSink::new(&args.output));

    let Some(bucket) = &args.s3_bucket else {
        return Ok(local);
    };

    let storage_config = ObjectStorageConfig::from_env().with_bucket(bucket.clone());
    let remote = ObjectStorage::new(&storage_config)
        .with_context(|| format!("connecting to bucket {}", bucket))?;
    info!(bucket = %bucket, "Uploading to object storage");

    Ok(Arc::new(
        FanoutSink::new()
            .with_sink(local)
            .with_sink(Arc::new(remote)),
    ))
}
