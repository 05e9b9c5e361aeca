use super::*;
use crate::downloader::item_task::{ItemContext, process_item};
use crate::tracker::ProcessedTracker;
use crate::types::MediaItemDescriptor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an item context with jitter disabled and a one-hour deadline
fn make_context(
    item: MediaItemDescriptor,
    tracker: Arc<ProcessedTracker>,
    output_dir: &Path,
) -> ItemContext {
    ItemContext {
        item,
        tracker,
        http: reqwest::Client::new(),
        output_dir: output_dir.to_path_buf(),
        deadline: Instant::now() + Duration::from_secs(3600),
        max_jitter: Duration::ZERO,
        cancel_token: CancellationToken::new(),
    }
}

#[tokio::test]
async fn successful_transfer_writes_file_and_persists_ledger() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    // The fetch must carry the full-resolution suffix
    Mock::given(method("GET"))
        .and(path("/media/m1=d"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let ctx = make_context(item, Arc::clone(&tracker), dir.path());

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Success);

    let written = std::fs::read(dir.path().join("a.jpg")).unwrap();
    assert_eq!(written, b"jpeg-bytes", "downloaded bytes must land in the output file");

    assert!(tracker.contains("m1").await, "success must mark the id");
    let ledger = std::fs::read_to_string(dir.path().join("progress.txt")).unwrap();
    assert!(
        ledger.lines().any(|l| l == "m1"),
        "success must persist the ledger immediately"
    );
}

#[tokio::test]
async fn ledger_hit_with_existing_file_skips_without_fetch() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    // Any fetch at all is a failure of the skip path
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    tracker.mark("m1").await;
    std::fs::write(dir.path().join("a.jpg"), b"already here").unwrap();

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let ctx = make_context(item, Arc::clone(&tracker), dir.path());

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Skip);
    assert!(tracker.contains("m1").await, "skip must leave the ledger entry in place");
}

#[tokio::test]
async fn stale_ledger_entry_is_unmarked_and_redownloaded() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/m1=d"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    // Marked processed, but the target file is absent
    tracker.mark("m1").await;

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let ctx = make_context(item, Arc::clone(&tracker), dir.path());

    let status = process_item(ctx).await.unwrap();
    assert_eq!(
        status,
        ResultStatus::Success,
        "a stale ledger entry must be re-attempted, never silently skipped"
    );
    assert!(dir.path().join("a.jpg").exists());
}

#[tokio::test]
async fn video_is_skipped_regardless_of_deadline() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));

    let item = video("v1", "clip.mp4", "https://cdn.invalid/media/v1");
    let mut ctx = make_context(item, tracker, dir.path());
    // Deadline already passed; the video check must still win
    ctx.deadline = Instant::now() - Duration::from_secs(1);

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Skip);
}

#[tokio::test]
async fn expired_deadline_performs_no_fetch_and_leaves_ledger_alone() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let mut ctx = make_context(item, Arc::clone(&tracker), dir.path());
    ctx.deadline = Instant::now() - Duration::from_secs(1);

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Expired);
    assert!(!tracker.contains("m1").await, "expiry must not touch the ledger");
    assert!(!dir.path().join("a.jpg").exists());
}

#[tokio::test]
async fn failed_fetch_is_item_local_and_leaves_ledger_alone() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/m1=d"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let ctx = make_context(item, Arc::clone(&tracker), dir.path());

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Fail);
    assert!(
        !tracker.contains("m1").await,
        "a failed item must stay eligible for the next run"
    );
    assert!(!dir.path().join("a.jpg").exists());
}

#[tokio::test]
async fn interrupted_wait_maps_to_skip() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let mut ctx = make_context(item, Arc::clone(&tracker), dir.path());
    ctx.max_jitter = Duration::from_secs(60);
    ctx.cancel_token = CancellationToken::new();
    ctx.cancel_token.cancel();

    let status = process_item(ctx).await.unwrap();
    assert_eq!(
        status,
        ResultStatus::Skip,
        "an interrupted wait is a graceful abort, not a failure"
    );
    assert!(!tracker.contains("m1").await);
}

#[tokio::test]
async fn existing_file_is_replaced_on_redownload() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(ProcessedTracker::new(dir.path()));
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/m1=d"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new-bytes".to_vec()))
        .mount(&server)
        .await;

    // File exists but the ledger has no record of it
    std::fs::write(dir.path().join("a.jpg"), b"old-bytes").unwrap();

    let item = photo("m1", "a.jpg", &format!("{}/media/m1", server.uri()));
    let ctx = make_context(item, tracker, dir.path());

    let status = process_item(ctx).await.unwrap();
    assert_eq!(status, ResultStatus::Success);

    let written = std::fs::read(dir.path().join("a.jpg")).unwrap();
    assert_eq!(written, b"new-bytes", "an unrecorded file must be overwritten");
}
