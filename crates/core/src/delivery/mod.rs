//! Artifact delivery.
//!
//! Hands a finished acquisition to the configured chat destination.

mod telegram;

pub use telegram::{TelegramDelivery, DEFAULT_API_BASE};

use async_trait::async_trait;
use thiserror::Error;

use crate::acquirer::Acquisition;
use crate::error::ErrorCategory;

/// Errors that can occur during delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Bot token or chat id has not been configured yet.
    #[error("delivery settings are incomplete, set bot token and chat id")]
    MissingSettings,

    /// The remote API rejected the upload.
    #[error("delivery API returned {status}: {description}")]
    Api { status: u16, description: String },

    /// Transport-level failure talking to the API.
    #[error("delivery request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to read the artifact from scratch storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeliveryError::MissingSettings => ErrorCategory::Configuration,
            DeliveryError::Api { .. } => ErrorCategory::ExternalService,
            DeliveryError::Http(_) => ErrorCategory::ExternalService,
            DeliveryError::Io(_) => ErrorCategory::Failure,
        }
    }
}

/// Sends acquired artifacts to the configured destination.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Uploads the acquisition's media file, with its thumbnail when present.
    /// Does not delete the files; the caller owns cleanup.
    async fn send_media(&self, acquisition: &Acquisition) -> Result<(), DeliveryError>;
}
