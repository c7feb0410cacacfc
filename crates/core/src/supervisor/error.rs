//! Error types for the supervisor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that can occur while supervising the external tool.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The tool binary was not found at the configured path.
    #[error("acquisition tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The process could not be started.
    #[error("failed to start acquisition tool: {0}")]
    SpawnFailed(std::io::Error),

    /// The tool exited with a non-zero exit code.
    #[error("acquisition tool exited with code {exit_code}")]
    NonZeroExit {
        exit_code: i32,
        /// Last few stderr lines, for diagnostics.
        stderr_tail: String,
    },

    /// I/O error while reading output or awaiting exit.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled; the process tree has already been killed and
    /// reaped by the time this is returned.
    #[error("tool run cancelled")]
    Cancelled,
}

impl SupervisorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SupervisorError::ToolNotFound { .. } | SupervisorError::SpawnFailed(_) => {
                ErrorCategory::Failure
            }
            SupervisorError::NonZeroExit { .. } => ErrorCategory::ExternalService,
            SupervisorError::Io(_) => ErrorCategory::Failure,
            SupervisorError::Cancelled => ErrorCategory::Failure,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SupervisorError::Cancelled)
    }
}
