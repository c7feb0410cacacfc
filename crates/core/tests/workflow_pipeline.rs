//! Workflow step-chain behavior with mocked collaborators.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use tubecast_core::testing::{
    MockAcquirer, MockDeliveryClient, MockHistoryStore, MockToolRunner,
};
use tubecast_core::{
    DeliveryError, HistoryRecord, IdExtractor, SourceUrl, SupervisorError, VideoId, WorkflowError,
    WorkflowExecutor, WorkflowNotice, WorkflowRequest,
};

struct Fixture {
    runner: Arc<MockToolRunner>,
    acquirer: Arc<MockAcquirer>,
    delivery: Arc<MockDeliveryClient>,
    history: Arc<MockHistoryStore>,
    executor: WorkflowExecutor,
}

fn fixture() -> Fixture {
    let runner = Arc::new(MockToolRunner::new());
    let acquirer = Arc::new(MockAcquirer::new());
    let delivery = Arc::new(MockDeliveryClient::new());
    let history = Arc::new(MockHistoryStore::new());
    let executor = WorkflowExecutor::new(
        Arc::new(IdExtractor::new(runner.clone())),
        acquirer.clone(),
        delivery.clone(),
        history.clone(),
    );
    Fixture {
        runner,
        acquirer,
        delivery,
        history,
        executor,
    }
}

fn request(
    url: &str,
    notices: Option<mpsc::UnboundedSender<WorkflowNotice>>,
) -> (WorkflowRequest, mpsc::Receiver<f32>) {
    let (progress_tx, progress_rx) = mpsc::channel(32);
    (
        WorkflowRequest {
            url: SourceUrl::new(url).unwrap(),
            custom_title: None,
            progress: progress_tx,
            notices,
        },
        progress_rx,
    )
}

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

#[tokio::test]
async fn test_success_runs_all_four_steps() {
    let f = fixture();
    let (req, mut progress_rx) = request(URL, None);
    let cancel = CancellationToken::new();

    let acquisition = f.executor.execute(req, &cancel).await.unwrap();

    assert_eq!(acquisition.video_id.as_str(), "dQw4w9WgXcQ");
    assert_eq!(f.acquirer.acquire_count().await, 1);
    assert_eq!(f.delivery.delivery_count().await, 1);
    assert_eq!(f.history.upsert_count(), 1);

    // Progress stream ends with the explicit 100.
    let mut seen = Vec::new();
    while let Some(p) = progress_rx.recv().await {
        seen.push(p);
    }
    assert_eq!(seen.last().copied(), Some(100.0));
}

#[tokio::test]
async fn test_extract_failure_short_circuits() {
    let f = fixture();
    // No id in the URL shape, so the tool fallback runs and fails.
    f.runner
        .set_next_error(SupervisorError::NonZeroExit {
            exit_code: 1,
            stderr_tail: "ERROR: unsupported URL".to_string(),
        })
        .await;
    let (req, _progress_rx) = request("https://www.youtube.com/playlist?list=PL4fG", None);
    let cancel = CancellationToken::new();

    let err = f.executor.execute(req, &cancel).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Extract(_)));
    assert_eq!(f.acquirer.acquire_count().await, 0);
    assert_eq!(f.delivery.delivery_count().await, 0);
    assert_eq!(f.history.upsert_count(), 0);
}

#[tokio::test]
async fn test_history_failure_does_not_fail_the_job() {
    let f = fixture();
    f.history.set_fail(true);
    let (req, _progress_rx) = request(URL, None);
    let cancel = CancellationToken::new();

    let result = f.executor.execute(req, &cancel).await;

    assert!(result.is_ok());
    assert_eq!(f.delivery.delivery_count().await, 1);
}

#[tokio::test]
async fn test_delivery_failure_carries_acquisition() {
    let f = fixture();
    f.delivery
        .set_next_error(DeliveryError::Api {
            status: 400,
            description: "chat not found".to_string(),
        })
        .await;
    let (req, _progress_rx) = request(URL, None);
    let cancel = CancellationToken::new();

    let err = f.executor.execute(req, &cancel).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Delivery { .. }));
    // Nothing reached the history after a failed delivery.
    assert_eq!(f.history.upsert_count(), 0);
    let orphan = err.into_acquisition().unwrap();
    assert_eq!(orphan.video_id.as_str(), "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_duplicate_notice_precedes_acquisition() {
    let f = fixture();
    f.history.insert_record(HistoryRecord {
        video_id: VideoId::new("dQw4w9WgXcQ").unwrap(),
        title: "earlier delivery".to_string(),
        downloaded_at: Utc::now(),
    });

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let (req, _progress_rx) = request(URL, Some(notice_tx));
    let cancel = CancellationToken::new();

    let result = f.executor.execute(req, &cancel).await;

    // Duplicate is advisory; the run still completes.
    assert!(result.is_ok());
    assert_eq!(f.acquirer.acquire_count().await, 1);
    match notice_rx.recv().await.unwrap() {
        WorkflowNotice::Duplicate { previous_title, .. } => {
            assert_eq!(previous_title, "earlier delivery");
        }
    }
}

#[tokio::test]
async fn test_cancellation_is_normalized() {
    let f = fixture();
    f.acquirer.set_hang_until_cancelled(true).await;
    let (req, _progress_rx) = request(URL, None);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = f.executor.execute(req, &cancel).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Cancelled));
    assert_eq!(err.code(), "cancelled");
    assert_eq!(f.delivery.delivery_count().await, 0);
}
