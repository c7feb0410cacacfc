//! Step chain for a single download job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::WorkflowError;
use crate::acquirer::{Acquirer, Acquisition};
use crate::delivery::DeliveryClient;
use crate::extractor::IdExtractor;
use crate::history::{HistoryRecord, HistoryStore};
use crate::media::{SourceUrl, VideoId};

/// Input for one workflow run.
pub struct WorkflowRequest {
    pub url: SourceUrl,
    pub custom_title: Option<String>,
    /// Receives download percentages, plus a final 100.0 on success.
    pub progress: mpsc::Sender<f32>,
    /// Optional side-channel for non-fatal observations.
    pub notices: Option<mpsc::UnboundedSender<WorkflowNotice>>,
}

/// Non-fatal observations raised mid-run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowNotice {
    /// The video was already delivered before. Raised before acquisition
    /// starts; the run continues regardless.
    Duplicate {
        video_id: VideoId,
        previous_title: String,
        downloaded_at: DateTime<Utc>,
    },
}

/// Runs the extract, acquire, deliver, persist chain for one job.
pub struct WorkflowExecutor {
    extractor: Arc<IdExtractor>,
    acquirer: Arc<dyn Acquirer>,
    delivery: Arc<dyn DeliveryClient>,
    history: Arc<dyn HistoryStore>,
}

impl WorkflowExecutor {
    pub fn new(
        extractor: Arc<IdExtractor>,
        acquirer: Arc<dyn Acquirer>,
        delivery: Arc<dyn DeliveryClient>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            extractor,
            acquirer,
            delivery,
            history,
        }
    }

    /// Executes the full chain. Each step short-circuits on failure; history
    /// lookups and writes are never fatal. Cancellation from any step is
    /// normalized to [`WorkflowError::Cancelled`] here.
    pub async fn execute(
        &self,
        request: WorkflowRequest,
        cancel: &CancellationToken,
    ) -> Result<Acquisition, WorkflowError> {
        let video_id = self
            .extractor
            .extract(&request.url, cancel)
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    WorkflowError::Cancelled
                } else {
                    WorkflowError::Extract(e)
                }
            })?;

        self.notify_duplicate(&video_id, &request);

        let acquisition = self
            .acquirer
            .acquire(
                &request.url,
                &video_id,
                request.custom_title.as_deref(),
                request.progress.clone(),
                cancel,
            )
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    WorkflowError::Cancelled
                } else {
                    WorkflowError::Acquire(e)
                }
            })?;

        if let Err(source) = self.delivery.send_media(&acquisition).await {
            return Err(WorkflowError::Delivery {
                source,
                acquisition,
            });
        }

        // Persistence failure downgrades to a warning: the user already has
        // the file, losing the history row must not fail the job.
        let record = HistoryRecord {
            video_id: acquisition.video_id.clone(),
            title: acquisition.title.clone(),
            downloaded_at: Utc::now(),
        };
        if let Err(e) = self.history.upsert(&record) {
            warn!(
                video_id = record.video_id.as_str(),
                "failed to persist history record: {}", e
            );
        }

        let _ = request.progress.try_send(100.0);
        info!(
            video_id = acquisition.video_id.as_str(),
            "workflow completed for {}", acquisition.title
        );
        Ok(acquisition)
    }

    /// Duplicate detection is advisory only; a lookup failure is logged and
    /// the run proceeds as if the video were new.
    fn notify_duplicate(&self, video_id: &VideoId, request: &WorkflowRequest) {
        let previous = match self.history.get_by_id(video_id) {
            Ok(previous) => previous,
            Err(e) => {
                warn!("duplicate check failed: {}", e);
                return;
            }
        };
        if let (Some(record), Some(notices)) = (previous, &request.notices) {
            let _ = notices.send(WorkflowNotice::Duplicate {
                video_id: video_id.clone(),
                previous_title: record.title,
                downloaded_at: record.downloaded_at,
            });
        }
    }
}
