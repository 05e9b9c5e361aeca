//! Run-level orchestration: the worker pool, fan-in, and reporting
//!
//! [`AlbumDownloader`] loads the ledger, obtains the descriptor set from
//! its [`AlbumSource`], dispatches one [`item_task`] per descriptor into a
//! bounded worker pool, waits for every task to produce a terminal status,
//! and persists the ledger once more at the end. Item-local failures stay
//! in that item's [`ResultStatus`]; only precondition violations and
//! ledger-persistence failures abort the run.

mod item_task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::album::{AlbumSource, ensure_unique_filenames};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tracker::ProcessedTracker;
use crate::types::{Event, ResultStatus, RunSummary};
use item_task::ItemContext;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Buffer size for the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestrates one album download run (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct AlbumDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Supplier of the descriptor set for the configured album
    source: Arc<dyn AlbumSource>,
    /// Persisted dedup ledger, shared by every worker
    /// Crate-visible so tests can inspect ledger state after a run
    pub(crate) tracker: Arc<ProcessedTracker>,
    /// HTTP client shared across all media transfers
    http: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Root cancellation token; cancelling it aborts pending jitter waits
    cancel_token: CancellationToken,
}

impl AlbumDownloader {
    /// Create a new downloader for the given configuration and source
    ///
    /// Validates the configuration and ensures the output directory
    /// exists. No remote call happens until [`run`](Self::run).
    pub async fn new(config: Config, source: Arc<dyn AlbumSource>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory '{}': {}",
                        config.output_dir.display(),
                        e
                    ),
                ))
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.download.fetch_timeout)
            .user_agent("album-sync")
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let tracker = Arc::new(ProcessedTracker::new(&config.output_dir));
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            source,
            tracker,
            http,
            event_tx,
            cancel_token: CancellationToken::new(),
        })
    }

    /// Subscribe to run events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Events are dropped silently when nobody listens.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Cancel pending work
    ///
    /// Cooperative: only the pre-transfer jitter wait observes the signal.
    /// Items interrupted there finish as `SKIP`; in-flight transfers run
    /// to completion.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Execute one full run
    ///
    /// Loads the ledger, fetches the descriptor set, dispatches one task
    /// per descriptor into the bounded worker pool, waits for full fan-in,
    /// tallies the summary, and persists the ledger once more.
    ///
    /// # Errors
    /// Fatal conditions only: a source failure (album not found, duplicate
    /// filenames), a ledger-persistence failure propagated out of a task,
    /// or a worker panic. Item-local transfer failures are tallied as
    /// `FAIL` and do not abort the run. Progress persisted by tasks that
    /// succeeded before a fatal error is retained.
    pub async fn run(&self) -> Result<RunSummary> {
        let loaded = self.tracker.load().await?;
        tracing::info!(count = loaded, "Loaded processed files");

        // Anchored once; every task compares against the same cutoff
        let deadline = Instant::now() + self.config.download.cutoff;

        let items = self.source.items().await?;
        ensure_unique_filenames(&items)?;
        let total_album = items.len() as u64;
        tracing::info!(count = total_album, album = %self.config.album_name, "Dispatching media items");

        let concurrent_limit = Arc::new(Semaphore::new(self.config.download.worker_count));

        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let limit = Arc::clone(&concurrent_limit);
            let event_tx = self.event_tx.clone();
            let ctx = ItemContext {
                item,
                tracker: Arc::clone(&self.tracker),
                http: self.http.clone(),
                output_dir: self.config.output_dir.clone(),
                deadline,
                max_jitter: self.config.download.max_jitter,
                cancel_token: self.cancel_token.clone(),
            };

            handles.push(tokio::spawn(async move {
                let _permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Worker("worker pool closed".to_string()))?;
                let filename = ctx.item.filename.clone();
                let status = item_task::process_item(ctx).await?;
                event_tx.send(Event::ItemFinished { filename, status }).ok();
                Ok::<ResultStatus, Error>(status)
            }));
        }

        // Full fan-in: every task produces a status before aggregation
        let mut summary = RunSummary {
            total_album,
            ..RunSummary::default()
        };
        for joined in futures::future::join_all(handles).await {
            let status = joined.map_err(|e| Error::Worker(e.to_string()))??;
            summary.record(status);
        }

        tracing::info!(%summary, "Finished");

        // Pool teardown; every permit has already been returned
        concurrent_limit.close();

        let written = self
            .tracker
            .save()
            .await
            .map_err(|e| Error::Ledger(e.to_string()))?;
        tracing::info!(count = written, "Wrote processed");

        self.event_tx.send(Event::RunFinished { summary }).ok();
        Ok(summary)
    }
}
