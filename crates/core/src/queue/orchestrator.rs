//! The download queue implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{Job, JobEvent, JobStatus, QueueError};
use crate::acquirer::Acquisition;
use crate::media::SourceUrl;
use crate::workflow::{WorkflowExecutor, WorkflowNotice, WorkflowRequest};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Sequential job queue over the workflow executor.
///
/// The worker task is spawned lazily on submission and exits when no pending
/// job remains; `worker_active` guarantees at most one worker at a time.
pub struct DownloadQueue {
    executor: Arc<WorkflowExecutor>,
    jobs: Arc<RwLock<Vec<Job>>>,
    cancel_tokens: Arc<RwLock<HashMap<String, CancellationToken>>>,
    worker_active: Arc<AtomicBool>,
    worker_spawns: Arc<AtomicU64>,
    events: broadcast::Sender<JobEvent>,
}

impl DownloadQueue {
    pub fn new(executor: Arc<WorkflowExecutor>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            executor,
            jobs: Arc::new(RwLock::new(Vec::new())),
            cancel_tokens: Arc::new(RwLock::new(HashMap::new())),
            worker_active: Arc::new(AtomicBool::new(false)),
            worker_spawns: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Validates the URL and enqueues a new job, starting the worker if none
    /// is active. Returns a snapshot of the pending job.
    pub async fn submit(
        self: &Arc<Self>,
        raw_url: &str,
        custom_title: Option<String>,
    ) -> Result<Job, QueueError> {
        let url = SourceUrl::new(raw_url)?;
        let job = Job::new(url, custom_title);

        {
            let mut jobs = self.jobs.write().await;
            jobs.push(job.clone());
        }
        info!(job_id = %job.id, "job submitted for {}", job.url);
        let _ = self.events.send(JobEvent::StateChanged {
            job_id: job.id.clone(),
            status: JobStatus::Pending,
        });

        self.ensure_worker();
        Ok(job)
    }

    /// Cancels a job. Pending jobs transition directly; running jobs get
    /// their cancellation token triggered and transition once the worker has
    /// reaped the subprocess. Terminal jobs are rejected.
    pub async fn cancel(&self, id: &str) -> Result<(), QueueError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| QueueError::NotFound { id: id.to_string() })?;

        match job.status {
            JobStatus::Pending => {
                job.status = JobStatus::Cancelled;
                let _ = self.events.send(JobEvent::StateChanged {
                    job_id: job.id.clone(),
                    status: JobStatus::Cancelled,
                });
                info!(job_id = id, "pending job cancelled");
                Ok(())
            }
            JobStatus::Running => {
                // The worker registers the token under the jobs lock together
                // with the Running transition, so a Running job always has one.
                if let Some(token) = self.cancel_tokens.read().await.get(id) {
                    token.cancel();
                    info!(job_id = id, "cancellation requested for running job");
                }
                Ok(())
            }
            status => Err(QueueError::InvalidState {
                id: id.to_string(),
                status,
            }),
        }
    }

    /// Snapshot of all jobs in submission order.
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Number of worker tasks ever spawned. Observable check that concurrent
    /// submissions share one worker.
    pub fn worker_loop_entries(&self) -> u64 {
        self.worker_spawns.load(Ordering::SeqCst)
    }

    fn ensure_worker(self: &Arc<Self>) {
        if self.worker_active.swap(true, Ordering::SeqCst) {
            return;
        }
        let queue = Arc::clone(self);
        queue.worker_spawns.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            debug!("queue worker started");
            queue.worker_loop().await;
            debug!("queue worker stopped");
        });
    }

    async fn worker_loop(self: Arc<Self>) {
        loop {
            let next = {
                let mut jobs = self.jobs.write().await;
                match jobs.iter_mut().find(|j| j.status == JobStatus::Pending) {
                    Some(job) => {
                        job.status = JobStatus::Running;
                        // The token must exist before the job is observable as
                        // Running, or a cancel landing in between would find
                        // nothing to trigger.
                        let token = CancellationToken::new();
                        self.cancel_tokens
                            .write()
                            .await
                            .insert(job.id.clone(), token.clone());
                        Some((job.clone(), token))
                    }
                    None => None,
                }
            };

            match next {
                Some((job, token)) => {
                    let _ = self.events.send(JobEvent::StateChanged {
                        job_id: job.id.clone(),
                        status: JobStatus::Running,
                    });
                    self.run_job(job, token).await;
                }
                None => {
                    self.worker_active.store(false, Ordering::SeqCst);
                    // A submission may have observed the worker as active
                    // between the empty check above and the flag clear.
                    let has_pending = self
                        .jobs
                        .read()
                        .await
                        .iter()
                        .any(|j| j.status == JobStatus::Pending);
                    if has_pending && !self.worker_active.swap(true, Ordering::SeqCst) {
                        continue;
                    }
                    break;
                }
            }
        }
    }

    async fn run_job(&self, job: Job, token: CancellationToken) {
        let (progress_tx, progress_rx) = mpsc::channel::<f32>(PROGRESS_CHANNEL_CAPACITY);
        let (notice_tx, notice_rx) = mpsc::unbounded_channel::<WorkflowNotice>();

        let progress_task = self.spawn_progress_forwarder(job.id.clone(), progress_rx);
        let notice_task = self.spawn_notice_forwarder(job.id.clone(), notice_rx);

        let request = WorkflowRequest {
            url: job.url.clone(),
            custom_title: job.custom_title.clone(),
            progress: progress_tx,
            notices: Some(notice_tx),
        };
        let result = self.executor.execute(request, &token).await;

        // Both channels close once the request (and its senders) is dropped.
        let _ = progress_task.await;
        let _ = notice_task.await;

        {
            let mut tokens = self.cancel_tokens.write().await;
            tokens.remove(&job.id);
        }

        let (status, error_code, error_message, acquisition) = match result {
            Ok(acquisition) => {
                Self::remove_artifacts(&acquisition).await;
                (JobStatus::Completed, None, None, Some(acquisition))
            }
            Err(e) if e.is_cancelled() => (JobStatus::Cancelled, None, None, None),
            Err(e) => {
                let code = e.code().to_string();
                let message = e.user_message();
                warn!(job_id = %job.id, code = %code, "job failed: {}", e);
                if let Some(orphan) = e.into_acquisition() {
                    Self::remove_artifacts(&orphan).await;
                }
                (JobStatus::Failed, Some(code), Some(message), None)
            }
        };

        {
            let mut jobs = self.jobs.write().await;
            if let Some(entry) = jobs.iter_mut().find(|j| j.id == job.id) {
                entry.status = status;
                entry.error_code = error_code;
                entry.error_message = error_message;
                if status == JobStatus::Completed {
                    entry.progress = 100.0;
                }
                entry.result = acquisition;
            }
        }
        let _ = self.events.send(JobEvent::StateChanged {
            job_id: job.id.clone(),
            status,
        });
        info!(job_id = %job.id, "job finished as {}", status);
    }

    fn spawn_progress_forwarder(
        &self,
        job_id: String,
        mut rx: mpsc::Receiver<f32>,
    ) -> tokio::task::JoinHandle<()> {
        let jobs = Arc::clone(&self.jobs);
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(percent) = rx.recv().await {
                {
                    let mut jobs = jobs.write().await;
                    if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                        job.progress = percent;
                    }
                }
                let _ = events.send(JobEvent::Progress {
                    job_id: job_id.clone(),
                    percent,
                });
            }
        })
    }

    fn spawn_notice_forwarder(
        &self,
        job_id: String,
        mut rx: mpsc::UnboundedReceiver<WorkflowNotice>,
    ) -> tokio::task::JoinHandle<()> {
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                match notice {
                    WorkflowNotice::Duplicate {
                        video_id,
                        previous_title,
                        downloaded_at,
                    } => {
                        let _ = events.send(JobEvent::Duplicate {
                            job_id: job_id.clone(),
                            video_id,
                            previous_title,
                            downloaded_at,
                        });
                    }
                }
            }
        })
    }

    /// Scratch cleanup after the artifact has been handed off (or delivery
    /// gave up on it). Failures are logged, never surfaced. Only the known
    /// artifact files are deleted, never a directory tree.
    async fn remove_artifacts(acquisition: &Acquisition) {
        let paths = std::iter::once(&acquisition.media_path)
            .chain(acquisition.thumbnail_path.as_ref());
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove artifact {}: {}", path.display(), e);
                }
            }
        }
        // The per-job scratch dir is empty once its artifacts are gone; a
        // non-empty or shared parent is left alone.
        if let Some(dir) = acquisition.media_path.parent() {
            let _ = tokio::fs::remove_dir(dir).await;
        }
    }
}
