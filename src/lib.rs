//! # album-sync
//!
//! Resumable, concurrent one-way downloader for Google Photos albums.
//!
//! ## Design Philosophy
//!
//! album-sync is designed to be:
//! - **Idempotent** - Re-runs skip everything already downloaded; a
//!   persisted ledger under the output directory makes completion durable
//! - **Interruption-safe** - Ctrl-C or a run deadline abandons pending
//!   items gracefully; progress persisted so far is retained
//! - **Library-first** - The CLI is a thin wrapper; the downloader embeds
//!   in any tokio application
//!
//! ## Quick Start
//!
//! ```no_run
//! use album_sync::{AlbumDownloader, Config, PhotosAlbumClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         album_name: "Vacation 2024".to_string(),
//!         credentials_dir: "~/.config/album-sync".into(),
//!         output_dir: "./photos".into(),
//!         download: Default::default(),
//!     };
//!
//!     let source = Arc::new(PhotosAlbumClient::new(
//!         &config.album_name,
//!         &config.credentials_dir,
//!     )?);
//!     let downloader = AlbumDownloader::new(config, source).await?;
//!
//!     let summary = downloader.run().await?;
//!     println!("{summary}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Album sources (the AlbumSource trait and the Photos API client)
pub mod album;
/// Configuration types
pub mod config;
/// Core downloader implementation (orchestrator and per-item tasks)
pub mod downloader;
/// Error types
pub mod error;
/// Persisted ledger of already-downloaded item ids
pub mod tracker;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use album::{AlbumSource, PhotosAlbumClient, ensure_unique_filenames};
pub use config::{Config, DownloadConfig};
pub use downloader::AlbumDownloader;
pub use error::{Error, Result};
pub use tracker::ProcessedTracker;
pub use types::{Event, MediaItemDescriptor, ResultStatus, RunSummary};
