//! Persisted ledger of already-downloaded media item ids
//!
//! The tracker is the single source of truth during a run for which items
//! have completed a download, here or in a prior run. The on-disk file
//! (`progress.txt` under the output directory, one id per line) is a
//! snapshot: loaded once at run start, rewritten wholesale on every save,
//! never read again until the next run.

use crate::error::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Name of the ledger file inside the output directory
const PROGRESS_FILE: &str = "progress.txt";

/// Durable, concurrency-safe record of already-downloaded item ids
///
/// All five operations go through one mutex so that concurrent workers
/// never interleave modifications to the set or race on the file write.
/// A `save` reflects every `mark`/`unmark` that completed before it was
/// invoked.
///
/// Persistence is a whole-file overwrite, not an append: a crash mid-write
/// can truncate the ledger. The affected items are simply re-downloaded on
/// the next run.
pub struct ProcessedTracker {
    /// Path of the ledger file
    progress_path: PathBuf,
    /// The id set, owned by this tracker and guarded by one lock
    ids: Mutex<HashSet<String>>,
}

impl ProcessedTracker {
    /// Create a tracker persisting under the given output directory
    ///
    /// No I/O happens here; call [`load`](Self::load) before dispatching
    /// any work.
    pub fn new(output_dir: &Path) -> Self {
        Self {
            progress_path: output_dir.join(PROGRESS_FILE),
            ids: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the in-memory set with the contents of the ledger file
    ///
    /// An absent file yields an empty set. Returns the resulting size.
    pub async fn load(&self) -> Result<usize> {
        let mut ids = self.ids.lock().await;
        ids.clear();
        match tokio::fs::read_to_string(&self.progress_path).await {
            Ok(contents) => {
                ids.extend(
                    contents
                        .lines()
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(ids.len())
    }

    /// Rewrite the whole ledger file from the current in-memory set
    ///
    /// Overwrites any prior content. Safe to call concurrently with the
    /// other operations; the write happens under the same lock. Returns
    /// the number of ids written.
    pub async fn save(&self) -> Result<usize> {
        let ids = self.ids.lock().await;
        let mut contents = ids.iter().cloned().collect::<Vec<_>>().join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        tokio::fs::write(&self.progress_path, contents).await?;
        Ok(ids.len())
    }

    /// Whether the given id has completed a download in this or a prior run
    pub async fn contains(&self, id: &str) -> bool {
        self.ids.lock().await.contains(id)
    }

    /// Record the given id as downloaded
    pub async fn mark(&self, id: &str) {
        self.ids.lock().await.insert(id.to_string());
    }

    /// Remove a stale completion record for the given id
    pub async fn unmark(&self, id: &str) {
        self.ids.lock().await.remove(id);
    }
}
