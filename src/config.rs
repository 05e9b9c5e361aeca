//! Configuration types for album-sync

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Download behavior configuration (concurrency, jitter, deadline)
///
/// Groups settings related to how media transfers are dispatched and
/// bounded. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Width of the worker pool (default: 10)
    ///
    /// Independent of album size — each worker processes one media item at
    /// a time and the pool never grows beyond this width.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Upper bound for the random pre-transfer jitter (default: 10 seconds)
    ///
    /// Each transfer waits a uniform random interval in `[0, max_jitter)`
    /// before touching the remote service, spreading load across workers.
    /// Zero disables the wait entirely (useful for deterministic tests).
    #[serde(default = "default_max_jitter", with = "duration_serde")]
    pub max_jitter: Duration,

    /// Run deadline measured from run start (default: 1 hour)
    ///
    /// Items evaluated after `start + cutoff` are abandoned as expired
    /// rather than attempted. Advisory and cooperative: in-flight
    /// transfers are never cancelled by the deadline.
    #[serde(default = "default_cutoff", with = "duration_serde")]
    pub cutoff: Duration,

    /// Timeout for a single media fetch (default: 5 minutes)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub fetch_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_jitter: default_max_jitter(),
            cutoff: default_cutoff(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

/// Main configuration for [`AlbumDownloader`](crate::downloader::AlbumDownloader)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Title of the remote album to download (matched case-insensitively)
    pub album_name: String,

    /// Directory holding `credentials.json` and the stored token
    pub credentials_dir: PathBuf,

    /// Directory media files and the progress ledger are written to
    pub output_dir: PathBuf,

    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// Returns [`Error::Config`] naming the offending key when a value is
    /// unusable. Called by the downloader constructor before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.album_name.trim().is_empty() {
            return Err(Error::Config {
                message: "album_name must not be empty".to_string(),
                key: Some("album_name".to_string()),
            });
        }
        if self.download.worker_count == 0 {
            return Err(Error::Config {
                message: "worker_count must be at least 1".to_string(),
                key: Some("worker_count".to_string()),
            });
        }
        Ok(())
    }
}

fn default_worker_count() -> usize {
    10
}

fn default_max_jitter() -> Duration {
    Duration::from_secs(10)
}

fn default_cutoff() -> Duration {
    Duration::from_secs(3600)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(300)
}

// Duration serialization helper (seconds as integers)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
