//! Download history API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tubecast_core::HistoryRecord;

use crate::state::AppState;

/// One delivered download
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub video_id: String,
    pub title: String,
    pub downloaded_at: String,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            video_id: record.video_id.as_str().to_string(),
            title: record.title,
            downloaded_at: record.downloaded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListHistoryResponse {
    pub downloads: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryErrorResponse {
    pub error: String,
}

/// List all delivered downloads, most recent first
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListHistoryResponse>, (StatusCode, Json<HistoryErrorResponse>)> {
    match state.history().list() {
        Ok(records) => Ok(Json(ListHistoryResponse {
            downloads: records.into_iter().map(HistoryEntry::from).collect(),
        })),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HistoryErrorResponse {
                error: err.to_string(),
            }),
        )),
    }
}
