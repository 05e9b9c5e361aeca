//! Core types and events for album-sync

use serde::{Deserialize, Serialize};

/// Immutable description of one remote media item
///
/// Produced once per run by an [`AlbumSource`](crate::album::AlbumSource)
/// and never mutated afterwards. The `id` is externally assigned and
/// unique; `filename` must be unique across the whole descriptor set for
/// one run (enforced before dispatch).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItemDescriptor {
    /// Externally assigned unique identifier
    pub id: String,
    /// Local filename the item is saved under (unique per run)
    pub filename: String,
    /// Base download URL; the full-resolution suffix is appended at fetch time
    pub download_url: String,
    /// Whether the item is a video (videos are skipped by this downloader)
    pub is_video: bool,
}

/// Terminal status of one media item for one run
///
/// Every descriptor reaches exactly one of these per run. Statuses are
/// used only for the end-of-run summary; they are not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Downloaded and recorded in the ledger
    Success,
    /// Nothing to do (already downloaded, a video, or an interrupted wait)
    Skip,
    /// The run deadline passed before this item was attempted
    Expired,
    /// The transfer failed; the item stays eligible for a future run
    Fail,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultStatus::Success => "SUCCESS",
            ResultStatus::Skip => "SKIP",
            ResultStatus::Expired => "EXPIRED",
            ResultStatus::Fail => "FAIL",
        };
        write!(f, "{}", s)
    }
}

/// Aggregated counts for one completed run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Items downloaded this run
    pub success: u64,
    /// Items skipped (already present, video, or interrupted wait)
    pub skipped: u64,
    /// Items abandoned because the run deadline had passed
    pub expired: u64,
    /// Items whose transfer failed
    pub failed: u64,
    /// Total items the album reported
    pub total_album: u64,
}

impl RunSummary {
    /// Tally one terminal status into the summary
    pub fn record(&mut self, status: ResultStatus) {
        match status {
            ResultStatus::Success => self.success += 1,
            ResultStatus::Skip => self.skipped += 1,
            ResultStatus::Expired => self.expired += 1,
            ResultStatus::Fail => self.failed += 1,
        }
    }

    /// Total items that reached any terminal status
    pub fn total_processed(&self) -> u64 {
        self.success + self.skipped + self.expired + self.failed
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SUCCESS={} SKIP={} EXPIRED={} FAIL={} TOTAL_ALBUM={} TOTAL_PROCESSED={}",
            self.success,
            self.skipped,
            self.expired,
            self.failed,
            self.total_album,
            self.total_processed()
        )
    }
}

/// Events emitted by [`AlbumDownloader`](crate::downloader::AlbumDownloader)
///
/// Consumers subscribe via
/// [`AlbumDownloader::subscribe`](crate::downloader::AlbumDownloader::subscribe).
/// Events are dropped silently when no subscriber is listening.
#[derive(Clone, Debug)]
pub enum Event {
    /// One media item reached a terminal status
    ItemFinished {
        /// Local filename of the item
        filename: String,
        /// The terminal status it reached
        status: ResultStatus,
    },
    /// The run completed and the ledger was persisted
    RunFinished {
        /// Aggregated counts for the run
        summary: RunSummary,
    },
}
