//! Queue ordering, single-worker, cancellation and cleanup behavior.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use tubecast_core::testing::{
    MockAcquirer, MockDeliveryClient, MockHistoryStore, MockToolRunner,
};
use tubecast_core::{
    DownloadQueue, HistoryRecord, IdExtractor, JobEvent, JobStatus, QueueError, VideoId,
    WorkflowExecutor,
};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

struct Fixture {
    acquirer: Arc<MockAcquirer>,
    history: Arc<MockHistoryStore>,
    queue: Arc<DownloadQueue>,
}

fn fixture() -> Fixture {
    let runner = Arc::new(MockToolRunner::new());
    let acquirer = Arc::new(MockAcquirer::new());
    let delivery = Arc::new(MockDeliveryClient::new());
    let history = Arc::new(MockHistoryStore::new());
    let executor = Arc::new(WorkflowExecutor::new(
        Arc::new(IdExtractor::new(runner)),
        acquirer.clone(),
        delivery,
        history.clone(),
    ));
    Fixture {
        acquirer,
        history,
        queue: Arc::new(DownloadQueue::new(executor)),
    }
}

async fn wait_for_status(queue: &DownloadQueue, id: &str, status: JobStatus) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(job) = queue.get(id).await {
            if job.status == status {
                return;
            }
            assert!(
                !(job.status.is_terminal() && job.status != status),
                "job {} ended as {} while waiting for {}",
                id,
                job.status,
                status
            );
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for job {} to become {}",
            id,
            status
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_jobs_run_in_submission_order() {
    let f = fixture();
    f.acquirer.set_delay_ms(20).await;
    let mut events = f.queue.subscribe();

    let j1 = f.queue.submit(URL, Some("first".to_string())).await.unwrap();
    let j2 = f.queue.submit(URL, Some("second".to_string())).await.unwrap();
    let j3 = f.queue.submit(URL, Some("third".to_string())).await.unwrap();

    wait_for_status(&f.queue, &j3.id, JobStatus::Completed).await;

    // Running transitions observed in submission order.
    let mut running_order = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let JobEvent::StateChanged {
            job_id,
            status: JobStatus::Running,
        } = event
        {
            running_order.push(job_id);
        }
    }
    assert_eq!(running_order, vec![j1.id, j2.id, j3.id]);
}

#[tokio::test]
async fn test_concurrent_submissions_share_one_worker() {
    let f = fixture();
    f.acquirer.set_delay_ms(20).await;

    let mut ids = Vec::new();
    let mut handles = Vec::new();
    for i in 0..5 {
        let queue = Arc::clone(&f.queue);
        handles.push(tokio::spawn(async move {
            queue.submit(URL, Some(format!("job-{}", i))).await.unwrap()
        }));
    }
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }

    for id in &ids {
        wait_for_status(&f.queue, id, JobStatus::Completed).await;
    }

    assert_eq!(f.acquirer.acquire_count().await, 5);
    assert_eq!(f.queue.worker_loop_entries(), 1);
}

#[tokio::test]
async fn test_cancel_running_job_reaps_within_bounds() {
    let f = fixture();
    f.acquirer.set_hang_until_cancelled(true).await;

    let job = f.queue.submit(URL, None).await.unwrap();
    wait_for_status(&f.queue, &job.id, JobStatus::Running).await;

    f.queue.cancel(&job.id).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(2),
        wait_for_status(&f.queue, &job.id, JobStatus::Cancelled),
    )
    .await
    .expect("cancellation should settle quickly");

    assert_eq!(f.acquirer.cancelled_count().await, 1);
    let settled = f.queue.get(&job.id).await.unwrap();
    assert!(settled.error_message.is_none());
}

#[tokio::test]
async fn test_cancel_immediately_after_running_event_is_honored() {
    let f = fixture();
    f.acquirer.set_hang_until_cancelled(true).await;
    let mut events = f.queue.subscribe();

    let job = f.queue.submit(URL, None).await.unwrap();

    // Cancel at the earliest externally observable moment of the Running
    // transition; the token must already be registered by then.
    loop {
        match events.recv().await.unwrap() {
            JobEvent::StateChanged {
                job_id,
                status: JobStatus::Running,
            } if job_id == job.id => break,
            _ => {}
        }
    }
    f.queue.cancel(&job.id).await.unwrap();

    tokio::time::timeout(
        Duration::from_secs(2),
        wait_for_status(&f.queue, &job.id, JobStatus::Cancelled),
    )
    .await
    .expect("cancel issued right after the Running event should settle");
    assert_eq!(f.acquirer.cancelled_count().await, 1);
}

#[tokio::test]
async fn test_cancel_pending_job_never_runs() {
    let f = fixture();
    f.acquirer.set_hang_until_cancelled(true).await;

    let running = f.queue.submit(URL, None).await.unwrap();
    wait_for_status(&f.queue, &running.id, JobStatus::Running).await;
    let pending = f.queue.submit(URL, None).await.unwrap();

    f.queue.cancel(&pending.id).await.unwrap();
    let job = f.queue.get(&pending.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);

    f.queue.cancel(&running.id).await.unwrap();
    wait_for_status(&f.queue, &running.id, JobStatus::Cancelled).await;

    // Only the first job ever reached the acquirer.
    assert_eq!(f.acquirer.acquire_count().await, 1);
}

#[tokio::test]
async fn test_completed_job_reports_progress_and_cleans_artifacts() {
    let f = fixture();
    let scratch = tempfile::tempdir().unwrap();
    f.acquirer.set_scratch_dir(scratch.path().to_path_buf()).await;
    f.acquirer.set_with_thumbnail(true).await;

    let job = f.queue.submit(URL, Some("My Song".to_string())).await.unwrap();
    wait_for_status(&f.queue, &job.id, JobStatus::Completed).await;

    let done = f.queue.get(&job.id).await.unwrap();
    assert_eq!(done.progress, 100.0);
    let result = done.result.expect("completed job carries its acquisition");
    assert_eq!(result.title, "My Song");

    // Scratch artifacts were removed after delivery.
    assert!(!result.media_path.exists());
    assert!(!scratch.path().join("dQw4w9WgXcQ").exists());

    assert_eq!(f.history.upsert_count(), 1);
}

#[tokio::test]
async fn test_duplicate_event_is_broadcast() {
    let f = fixture();
    f.history.insert_record(HistoryRecord {
        video_id: VideoId::new("dQw4w9WgXcQ").unwrap(),
        title: "already delivered".to_string(),
        downloaded_at: Utc::now(),
    });
    let mut events = f.queue.subscribe();

    let job = f.queue.submit(URL, None).await.unwrap();
    wait_for_status(&f.queue, &job.id, JobStatus::Completed).await;

    let mut saw_duplicate = false;
    while let Ok(event) = events.try_recv() {
        if let JobEvent::Duplicate {
            job_id,
            previous_title,
            ..
        } = event
        {
            assert_eq!(job_id, job.id);
            assert_eq!(previous_title, "already delivered");
            saw_duplicate = true;
        }
    }
    assert!(saw_duplicate);
}

#[tokio::test]
async fn test_invalid_url_is_rejected_at_submission() {
    let f = fixture();
    let err = f
        .queue
        .submit("https://example.com/watch?v=dQw4w9WgXcQ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::InvalidUrl(_)));
    assert!(f.queue.jobs().await.is_empty());
}

#[tokio::test]
async fn test_cancel_terminal_and_unknown_jobs() {
    let f = fixture();
    let job = f.queue.submit(URL, None).await.unwrap();
    wait_for_status(&f.queue, &job.id, JobStatus::Completed).await;

    let err = f.queue.cancel(&job.id).await.unwrap_err();
    assert!(matches!(err, QueueError::InvalidState { .. }));

    let err = f.queue.cancel("no-such-id").await.unwrap_err();
    assert!(matches!(err, QueueError::NotFound { .. }));
}

#[tokio::test]
async fn test_failed_job_records_code_and_message() {
    let f = fixture();
    f.acquirer
        .set_next_error(tubecast_core::AcquireError::MediaMissing {
            dir: std::path::PathBuf::from("/tmp/none"),
        })
        .await;

    let job = f.queue.submit(URL, None).await.unwrap();
    wait_for_status(&f.queue, &job.id, JobStatus::Failed).await;

    let failed = f.queue.get(&job.id).await.unwrap();
    assert_eq!(failed.error_code.as_deref(), Some("acquire.media_missing"));
    assert!(failed.error_message.is_some());
}
