//! Shared test helpers for creating AlbumDownloader instances in tests.

use crate::album::AlbumSource;
use crate::config::{Config, DownloadConfig};
use crate::downloader::AlbumDownloader;
use crate::error::Result;
use crate::types::MediaItemDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Stub [`AlbumSource`] returning a fixed descriptor set
pub(crate) struct StaticAlbumSource {
    items: Vec<MediaItemDescriptor>,
}

impl StaticAlbumSource {
    pub(crate) fn new(items: Vec<MediaItemDescriptor>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl AlbumSource for StaticAlbumSource {
    async fn items(&self) -> Result<Vec<MediaItemDescriptor>> {
        Ok(self.items.clone())
    }
}

/// Build a photo descriptor pointing at the given download URL
pub(crate) fn photo(id: &str, filename: &str, download_url: &str) -> MediaItemDescriptor {
    MediaItemDescriptor {
        id: id.to_string(),
        filename: filename.to_string(),
        download_url: download_url.to_string(),
        is_video: false,
    }
}

/// Build a video descriptor (always skipped by the downloader)
pub(crate) fn video(id: &str, filename: &str, download_url: &str) -> MediaItemDescriptor {
    MediaItemDescriptor {
        is_video: true,
        ..photo(id, filename, download_url)
    }
}

/// Helper to create a test AlbumDownloader over a stub source.
/// Jitter is disabled for determinism. Returns the downloader and the
/// tempdir holding its output directory (which must be kept alive).
pub(crate) async fn create_test_downloader(
    items: Vec<MediaItemDescriptor>,
) -> (AlbumDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let config = Config {
        album_name: "Test Album".to_string(),
        credentials_dir: temp_dir.path().join("creds"),
        output_dir: temp_dir.path().join("output"),
        download: DownloadConfig {
            worker_count: 4,
            max_jitter: Duration::ZERO,
            cutoff: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(10),
        },
    };

    let source = Arc::new(StaticAlbumSource::new(items));
    let downloader = AlbumDownloader::new(config, source).await.unwrap();

    (downloader, temp_dir)
}
