//! Queue job types and events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::acquirer::Acquisition;
use crate::error::ErrorCategory;
use crate::media::{SourceUrl, ValidationError, VideoId};

/// Lifecycle state of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// One download job and its observable state.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub url: SourceUrl,
    pub custom_title: Option<String>,
    pub status: JobStatus,
    /// Last reported download percentage, 0..=100.
    pub progress: f32,
    /// Machine-readable error code when `status` is `Failed`.
    pub error_code: Option<String>,
    /// Human-readable failure message when `status` is `Failed`.
    pub error_message: Option<String>,
    /// Populated on completion. Paths are already deleted; kept for title and
    /// id reporting.
    #[serde(skip)]
    pub result: Option<Acquisition>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn new(url: SourceUrl, custom_title: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
            custom_title,
            status: JobStatus::Pending,
            progress: 0.0,
            error_code: None,
            error_message: None,
            result: None,
            submitted_at: Utc::now(),
        }
    }
}

/// Events broadcast to queue observers.
#[derive(Debug, Clone)]
pub enum JobEvent {
    StateChanged {
        job_id: String,
        status: JobStatus,
    },
    Progress {
        job_id: String,
        percent: f32,
    },
    /// The video was delivered before; the job continues anyway.
    Duplicate {
        job_id: String,
        video_id: VideoId,
        previous_title: String,
        downloaded_at: DateTime<Utc>,
    },
}

/// Errors surfaced by queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    InvalidUrl(#[from] ValidationError),

    #[error("no job with id {id}")]
    NotFound { id: String },

    #[error("job {id} is {status} and cannot be cancelled")]
    InvalidState { id: String, status: JobStatus },
}

impl QueueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueueError::InvalidUrl(_) => ErrorCategory::Validation,
            QueueError::NotFound { .. } => ErrorCategory::NotFound,
            QueueError::InvalidState { .. } => ErrorCategory::Conflict,
        }
    }
}
