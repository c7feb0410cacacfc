//! Error types for the extractor module.

use thiserror::Error;

use crate::error::ErrorCategory;
use crate::media::ValidationError;
use crate::supervisor::SupervisorError;

/// Errors that can occur while extracting a video id from a URL.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The metadata-mode tool run printed something that is not an 11-char id.
    /// Carries the offending value for diagnostics.
    #[error("tool printed an id of unexpected length: {value:?}")]
    InvalidIdLength { value: String },

    /// The fallback tool invocation failed.
    #[error(transparent)]
    Tool(#[from] SupervisorError),

    /// Captured id failed value-object validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ExtractorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractorError::InvalidIdLength { .. } => ErrorCategory::Validation,
            ExtractorError::Tool(e) => e.category(),
            ExtractorError::Validation(_) => ErrorCategory::Validation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractorError::Tool(e) if e.is_cancelled())
    }
}
