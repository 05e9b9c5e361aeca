//! CLI bootstrap for album-sync
//!
//! Parses the three required arguments, wires Ctrl-C to cooperative
//! cancellation, runs one download pass, and exits non-zero on any fatal
//! error. All real behavior lives in the library.

use album_sync::{AlbumDownloader, Config, DownloadConfig, PhotosAlbumClient};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Download a Google Photos album to a local directory, resumably
#[derive(Debug, Parser)]
#[command(name = "album-sync", version, about)]
struct Args {
    /// The album to download
    #[arg(long)]
    album_name: String,

    /// The directory holding credentials.json and the stored token
    #[arg(long)]
    credentials_dir: PathBuf,

    /// The directory to save the media to
    #[arg(long)]
    output_dir: PathBuf,

    /// Width of the worker pool
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Run deadline in seconds, measured from run start
    #[arg(long, default_value_t = 3600)]
    cutoff_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!(error = %e, "Run failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> album_sync::Result<()> {
    let config = Config {
        album_name: args.album_name,
        credentials_dir: args.credentials_dir,
        output_dir: args.output_dir,
        download: DownloadConfig {
            worker_count: args.workers,
            cutoff: Duration::from_secs(args.cutoff_secs),
            ..DownloadConfig::default()
        },
    };

    let source = Arc::new(PhotosAlbumClient::new(
        &config.album_name,
        &config.credentials_dir,
    )?);
    let downloader = AlbumDownloader::new(config, source).await?;

    // Ctrl-C cancels pending jitter waits; those items finish as SKIP
    let canceller = downloader.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, abandoning pending items");
            canceller.cancel();
        }
    });

    downloader.run().await?;
    Ok(())
}
