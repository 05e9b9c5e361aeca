//! Per-item decision policy and transfer execution
//!
//! One [`ItemContext`] is built per media item and consumed by
//! [`process_item`], which decides the item's fate and, if warranted,
//! transfers its bytes to local storage. Each item is evaluated exactly
//! once per run; there are no retries within a run.

use crate::error::{Error, Result};
use crate::tracker::ProcessedTracker;
use crate::types::{MediaItemDescriptor, ResultStatus};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Suffix appended to the base URL to select full-resolution original bytes
const FULL_RESOLUTION_SUFFIX: &str = "=d";

/// Everything one item task needs, captured at dispatch time
pub(crate) struct ItemContext {
    /// The media item this task decides the fate of
    pub(crate) item: MediaItemDescriptor,
    /// Shared ledger of already-downloaded ids
    pub(crate) tracker: Arc<ProcessedTracker>,
    /// HTTP client shared across all workers
    pub(crate) http: reqwest::Client,
    /// Directory the media file is written into
    pub(crate) output_dir: PathBuf,
    /// Run deadline; items evaluated after it are abandoned as expired
    pub(crate) deadline: Instant,
    /// Upper bound for the pre-transfer jitter wait (zero disables it)
    pub(crate) max_jitter: Duration,
    /// Cancellation signal; only the jitter wait observes it
    pub(crate) cancel_token: CancellationToken,
}

/// Outcome of the interruptible pre-transfer wait
///
/// Cancellation is consumed as data by the decision policy, never raised
/// as an error.
#[derive(Debug, PartialEq, Eq)]
enum WaitDisposition {
    /// The full jitter interval elapsed
    Completed,
    /// The wait was interrupted; the item is abandoned gracefully
    Interrupted,
}

/// Decide the fate of one media item and transfer its bytes if warranted
///
/// The policy is evaluated in order: stale-ledger recovery, video
/// exclusion, deadline check, jitter wait, transfer. Exactly one terminal
/// [`ResultStatus`] is produced. Item-local failures (network, local I/O)
/// come back as `Ok(Fail)`; only a ledger-persistence failure after a
/// successful transfer is an `Err`, because at that point the in-memory
/// and on-disk ledgers may diverge.
pub(crate) async fn process_item(ctx: ItemContext) -> Result<ResultStatus> {
    let local_path = ctx.output_dir.join(&ctx.item.filename);

    if ctx.tracker.contains(&ctx.item.id).await {
        if tokio::fs::try_exists(&local_path).await.unwrap_or(false) {
            tracing::info!(filename = %ctx.item.filename, "Not processing, already handled and exists");
            return Ok(ResultStatus::Skip);
        }
        // Ledger says done but the file is gone; the record is stale
        ctx.tracker.unmark(&ctx.item.id).await;
    }

    if ctx.item.is_video {
        tracing::info!(filename = %ctx.item.filename, "Not processing, video");
        return Ok(ResultStatus::Skip);
    }

    if Instant::now() > ctx.deadline {
        tracing::info!(filename = %ctx.item.filename, "Not processing, after cutoff time");
        return Ok(ResultStatus::Expired);
    }

    if jittered_wait(ctx.max_jitter, &ctx.cancel_token).await == WaitDisposition::Interrupted {
        return Ok(ResultStatus::Skip);
    }

    if let Err(e) = transfer(&ctx, &local_path).await {
        tracing::error!(filename = %ctx.item.filename, error = %e, "Error downloading");
        return Ok(ResultStatus::Fail);
    }
    tracing::info!(filename = %ctx.item.filename, "Saved");

    // The file is on disk; failing to record that is fatal
    ctx.tracker.mark(&ctx.item.id).await;
    ctx.tracker
        .save()
        .await
        .map_err(|e| Error::Ledger(e.to_string()))?;

    Ok(ResultStatus::Success)
}

/// Wait a uniform random interval in `[0, max_jitter)`, interruptibly
///
/// Spreads transfer starts across workers so a large album does not burst
/// the remote service all at once.
async fn jittered_wait(max_jitter: Duration, cancel: &CancellationToken) -> WaitDisposition {
    if cancel.is_cancelled() {
        return WaitDisposition::Interrupted;
    }
    let bound = max_jitter.as_millis() as u64;
    if bound == 0 {
        return WaitDisposition::Completed;
    }

    // Draw before the await; the RNG handle must not cross a suspension point
    let millis = rand::thread_rng().gen_range(0..bound);
    tokio::select! {
        _ = cancel.cancelled() => WaitDisposition::Interrupted,
        _ = tokio::time::sleep(Duration::from_millis(millis)) => WaitDisposition::Completed,
    }
}

/// Fetch the full-resolution bytes and write them to the local path
///
/// Any existing file at the path is replaced.
async fn transfer(ctx: &ItemContext, local_path: &Path) -> Result<()> {
    let url = Url::parse(&format!("{}{}", ctx.item.download_url, FULL_RESOLUTION_SUFFIX))
        .map_err(|e| {
            Error::Other(format!(
                "Invalid download URL '{}': {}",
                ctx.item.download_url, e
            ))
        })?;

    let response = ctx.http.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(local_path, &bytes).await?;

    Ok(())
}
