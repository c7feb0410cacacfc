//! Job API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tubecast_core::{ErrorCategory, Job, JobStatus, QueueError};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a download job
#[derive(Debug, Deserialize)]
pub struct SubmitJobBody {
    /// The video URL to download
    pub url: String,
    /// Optional title override for the delivered file
    pub custom_title: Option<String>,
}

/// Response for job operations
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub url: String,
    pub custom_title: Option<String>,
    pub status: JobStatus,
    pub progress: f32,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub title: Option<String>,
    pub submitted_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            url: job.url.to_string(),
            custom_title: job.custom_title,
            status: job.status,
            progress: job.progress,
            error_code: job.error_code,
            error_message: job.error_message,
            title: job.result.map(|r| r.title),
            submitted_at: job.submitted_at.to_rfc3339(),
        }
    }
}

/// Response for listing jobs
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobResponse>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
    pub category: ErrorCategory,
}

fn error_response(err: QueueError) -> (StatusCode, Json<JobErrorResponse>) {
    let status = match err.category() {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(JobErrorResponse {
            error: err.to_string(),
            category: err.category(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new download job
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitJobBody>,
) -> Result<(StatusCode, Json<JobResponse>), (StatusCode, Json<JobErrorResponse>)> {
    match state.queue().submit(&body.url, body.custom_title).await {
        Ok(job) => Ok((StatusCode::CREATED, Json(job.into()))),
        Err(err) => Err(error_response(err)),
    }
}

/// List all jobs, most recent first
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<ListJobsResponse> {
    let mut jobs = state.queue().jobs().await;
    jobs.reverse();
    Json(ListJobsResponse {
        jobs: jobs.into_iter().map(JobResponse::from).collect(),
    })
}

/// Get a single job by id
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, (StatusCode, Json<JobErrorResponse>)> {
    match state.queue().get(&id).await {
        Some(job) => Ok(Json(job.into())),
        None => Err(error_response(QueueError::NotFound { id })),
    }
}

/// Cancel a pending or running job
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<JobErrorResponse>)> {
    match state.queue().cancel(&id).await {
        Ok(()) => Ok(StatusCode::ACCEPTED),
        Err(err) => Err(error_response(err)),
    }
}
