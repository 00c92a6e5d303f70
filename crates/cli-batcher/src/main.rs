use anyhow::{Context, Result};
use batcher::{config::BatchConfig, runner::BatchRunner};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Batch media-transcoding orchestrator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (JSON or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Media root to scan (overrides config)
    #[arg(short, long)]
    media_root: Option<PathBuf>,

    /// Maximum number of jobs this run (overrides config)
    #[arg(short, long)]
    batch_limit: Option<usize>,

    /// Select and log jobs without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Use RUST_LOG env var when set; -v forces debug level
    let mut builder = env_logger::Builder::from_default_env();
    builder.format_timestamp_secs();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let mut cfg = BatchConfig::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(media_root) = args.media_root {
        cfg.media_root = media_root;
    }
    if let Some(batch_limit) = args.batch_limit {
        cfg.batch_limit = batch_limit;
    }
    if args.dry_run {
        cfg.dry_run = true;
    }

    info!("Batch transcoder starting");
    info!("  Media root: {}", cfg.media_root.display());
    info!("  Batch limit: {}", cfg.batch_limit);
    info!("  Ledger: {}", cfg.ledger_path.display());
    info!("  Staging dir: {}", cfg.staging_dir.display());
    info!("  Transcoder: {} (profile: {})",
        cfg.transcoder_bin.display(),
        cfg.transcode_profile
    );
    info!("  Dry run: {}", cfg.dry_run);

    // Fatal preconditions (missing media root, unavailable ledger) surface
    // here and exit non-zero before any summary is produced.
    let summary = BatchRunner::new(cfg).run().await?;

    info!(
        "Summary: {} discovered, {} already done, {} attempted, {} succeeded, {} failed",
        summary.discovered,
        summary.skipped_done,
        summary.attempted,
        summary.succeeded,
        summary.failed
    );
    Ok(())
}
