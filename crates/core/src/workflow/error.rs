//! Error types for the workflow module.

use thiserror::Error;

use crate::acquirer::{AcquireError, Acquisition};
use crate::delivery::DeliveryError;
use crate::error::ErrorCategory;
use crate::extractor::ExtractorError;

/// A failed workflow run, tagged by the step that failed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("extraction failed: {0}")]
    Extract(#[source] ExtractorError),

    #[error("acquisition failed: {0}")]
    Acquire(#[source] AcquireError),

    /// Delivery failed after acquisition succeeded. The acquisition is
    /// carried so the caller can delete the scratch artifacts.
    #[error("delivery failed: {source}")]
    Delivery {
        #[source]
        source: DeliveryError,
        acquisition: Acquisition,
    },

    /// The job was cancelled mid-run. Scratch artifacts for the cancelled
    /// step have already been removed.
    #[error("job cancelled")]
    Cancelled,
}

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WorkflowError::Extract(e) => e.category(),
            WorkflowError::Acquire(e) => e.category(),
            WorkflowError::Delivery { source, .. } => source.category(),
            WorkflowError::Cancelled => ErrorCategory::Failure,
        }
    }

    /// Stable machine-readable code, step-dotted.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::Extract(ExtractorError::InvalidIdLength { .. }) => {
                "extract.invalid_id_length"
            }
            WorkflowError::Extract(ExtractorError::Validation(_)) => "extract.invalid_url",
            WorkflowError::Extract(ExtractorError::Tool(_)) => "extract.tool_failed",
            WorkflowError::Acquire(AcquireError::MediaMissing { .. }) => "acquire.media_missing",
            WorkflowError::Acquire(_) => "acquire.tool_failed",
            WorkflowError::Delivery {
                source: DeliveryError::MissingSettings,
                ..
            } => "delivery.missing_settings",
            WorkflowError::Delivery { .. } => "delivery.failed",
            WorkflowError::Cancelled => "cancelled",
        }
    }

    /// Short message safe to surface to the requesting user.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Extract(ExtractorError::Validation(e)) => e.to_string(),
            WorkflowError::Extract(_) => "Could not resolve a video id for that link".to_string(),
            WorkflowError::Acquire(_) => "Download failed".to_string(),
            WorkflowError::Delivery {
                source: DeliveryError::MissingSettings,
                ..
            } => "Delivery is not configured yet".to_string(),
            WorkflowError::Delivery { .. } => "Upload failed".to_string(),
            WorkflowError::Cancelled => "Cancelled".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkflowError::Cancelled)
    }

    /// Takes the orphaned acquisition out of a delivery failure, if any.
    pub fn into_acquisition(self) -> Option<Acquisition> {
        match self {
            WorkflowError::Delivery { acquisition, .. } => Some(acquisition),
            _ => None,
        }
    }
}
