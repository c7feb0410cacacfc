//! Download history.
//!
//! Records every delivered video so repeat requests can be flagged before the
//! download starts.

mod sqlite;

pub use sqlite::SqliteHistoryStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::media::VideoId;

/// One delivered download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub video_id: VideoId,
    pub title: String,
    pub downloaded_at: DateTime<Utc>,
}

/// Errors that can occur while reading or writing history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(String),
}

impl HistoryError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Failure
    }
}

/// Persistent record of completed downloads.
pub trait HistoryStore: Send + Sync {
    /// Looks up a previous download of the same video, if any.
    fn get_by_id(&self, video_id: &VideoId) -> Result<Option<HistoryRecord>, HistoryError>;

    /// Inserts or refreshes the record for a delivered download.
    fn upsert(&self, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// All records, most recent first.
    fn list(&self) -> Result<Vec<HistoryRecord>, HistoryError>;
}
