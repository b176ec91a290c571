//! Ingestion CLI: scan the configured video directory, deduplicate and
//! index every source, and persist the store.

use std::path::PathBuf;

use anyhow::{bail, Context};
use framesift::{AppContext, FramesiftConfig};
use tracing_subscriber::EnvFilter;

struct Args {
    config_path: Option<PathBuf>,
    video_dir: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config_path: None,
        video_dir: None,
        verbose: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = iter.next().context("--config requires a path")?;
                args.config_path = Some(PathBuf::from(value));
            }
            "--video-dir" => {
                let value = iter.next().context("--video-dir requires a path")?;
                args.video_dir = Some(PathBuf::from(value));
            }
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => {
                println!(
                    "Usage: framesift [--config <file.yaml>] [--video-dir <dir>] [--verbose]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}` (try --help)"),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &args.config_path {
        Some(path) => FramesiftConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FramesiftConfig::default(),
    };

    let ctx = AppContext::initialize(config).context("initializing application context")?;
    let mut pipeline = ctx.build_pipeline().context("building ingestion pipeline")?;

    let video_dir = args
        .video_dir
        .unwrap_or_else(|| ctx.config.ingest.video_dir.clone());
    let extensions = ctx.config.ingest.allowed_extensions.clone();

    pipeline
        .ingest_all(&video_dir, &extensions)
        .context("ingestion run failed")?;
    pipeline.finalize().context("persisting index")?;

    let stats = pipeline.stats();
    tracing::info!(
        videos_processed = stats.videos_processed,
        frames_extracted = stats.frames_extracted,
        duplicates_detected = stats.duplicates_detected,
        frames_stored = stats.frames_stored,
        frames_failed = stats.frames_failed,
        "ingestion complete"
    );

    Ok(())
}
