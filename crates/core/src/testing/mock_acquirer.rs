//! Mock acquirer for testing.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::acquirer::{AcquireError, Acquirer, Acquisition};
use crate::media::{SourceUrl, VideoId};
use crate::supervisor::SupervisorError;

/// A recorded acquisition request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAcquire {
    pub url: SourceUrl,
    pub video_id: VideoId,
    pub custom_title: Option<String>,
}

/// Mock implementation of the Acquirer trait.
///
/// On success it writes a real media file (and optionally a thumbnail) under
/// the configured scratch directory, so artifact-cleanup behavior can be
/// asserted against the filesystem.
#[derive(Debug)]
pub struct MockAcquirer {
    requests: Arc<RwLock<Vec<RecordedAcquire>>>,
    next_error: Arc<RwLock<Option<AcquireError>>>,
    scratch_dir: Arc<RwLock<Option<PathBuf>>>,
    with_thumbnail: Arc<RwLock<bool>>,
    progress_values: Arc<RwLock<Vec<f32>>>,
    /// Simulated acquisition duration in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    hang_until_cancelled: Arc<RwLock<bool>>,
    cancelled: Arc<RwLock<usize>>,
}

impl Default for MockAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAcquirer {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            scratch_dir: Arc::new(RwLock::new(None)),
            with_thumbnail: Arc::new(RwLock::new(false)),
            progress_values: Arc::new(RwLock::new(vec![50.0])),
            delay_ms: Arc::new(RwLock::new(0)),
            hang_until_cancelled: Arc::new(RwLock::new(false)),
            cancelled: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn acquire_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn recorded_requests(&self) -> Vec<RecordedAcquire> {
        self.requests.read().await.clone()
    }

    pub async fn set_next_error(&self, error: AcquireError) {
        *self.next_error.write().await = Some(error);
    }

    /// Create real artifacts under this directory on success.
    pub async fn set_scratch_dir(&self, dir: PathBuf) {
        *self.scratch_dir.write().await = Some(dir);
    }

    pub async fn set_with_thumbnail(&self, with: bool) {
        *self.with_thumbnail.write().await = with;
    }

    pub async fn set_progress_values(&self, values: Vec<f32>) {
        *self.progress_values.write().await = values;
    }

    /// Simulate a slow acquisition.
    pub async fn set_delay_ms(&self, delay_ms: u64) {
        *self.delay_ms.write().await = delay_ms;
    }

    /// Make acquisitions block until cancelled, like a download that never
    /// finishes.
    pub async fn set_hang_until_cancelled(&self, hang: bool) {
        *self.hang_until_cancelled.write().await = hang;
    }

    /// Number of acquisitions that ended by cancellation.
    pub async fn cancelled_count(&self) -> usize {
        *self.cancelled.read().await
    }
}

#[async_trait]
impl Acquirer for MockAcquirer {
    async fn acquire(
        &self,
        url: &SourceUrl,
        video_id: &VideoId,
        custom_title: Option<&str>,
        progress: mpsc::Sender<f32>,
        cancel: &CancellationToken,
    ) -> Result<Acquisition, AcquireError> {
        self.requests.write().await.push(RecordedAcquire {
            url: url.clone(),
            video_id: video_id.clone(),
            custom_title: custom_title.map(|t| t.to_string()),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if *self.hang_until_cancelled.read().await {
            cancel.cancelled().await;
            *self.cancelled.write().await += 1;
            return Err(AcquireError::Supervisor(SupervisorError::Cancelled));
        }

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        }

        for value in self.progress_values.read().await.iter() {
            let _ = progress.send(*value).await;
        }

        let title = custom_title.unwrap_or("Mock Title").to_string();
        let (media_path, thumbnail_path) = match self.scratch_dir.read().await.clone() {
            Some(scratch) => {
                let dir = scratch.join(video_id.as_str());
                tokio::fs::create_dir_all(&dir).await?;
                let media = dir.join(format!("{}.mp3", title));
                tokio::fs::write(&media, b"mock audio").await?;
                let thumb = if *self.with_thumbnail.read().await {
                    let t = dir.join(format!("{}.jpg", title));
                    tokio::fs::write(&t, b"mock image").await?;
                    Some(t)
                } else {
                    None
                };
                (media, thumb)
            }
            None => (PathBuf::from(format!("/tmp/{}.mp3", title)), None),
        };

        Ok(Acquisition {
            video_id: video_id.clone(),
            title,
            media_path,
            thumbnail_path,
        })
    }
}
