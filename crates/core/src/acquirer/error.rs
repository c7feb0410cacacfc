//! Error types for the acquirer module.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::supervisor::SupervisorError;

/// Errors that can occur during acquisition.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The supervised tool run failed or was cancelled.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// The tool reported success but no media file was found in the scratch
    /// directory. The filename template and the directory scan disagreed;
    /// this must never silently produce a wrong file.
    #[error("no media file found after successful tool exit in {dir}")]
    MediaMissing { dir: PathBuf },

    /// I/O error while preparing or scanning scratch storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AcquireError::Supervisor(e) => e.category(),
            AcquireError::MediaMissing { .. } => ErrorCategory::NotFound,
            AcquireError::Io(_) => ErrorCategory::Failure,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AcquireError::Supervisor(e) if e.is_cancelled())
    }
}
