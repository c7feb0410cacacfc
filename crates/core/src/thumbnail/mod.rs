//! Thumbnail post-processing.
//!
//! The delivery target wants a square JPEG no larger than a fixed dimension;
//! the acquisition tool hands us whatever the source had.

mod image_processor;

pub use image_processor::ImageThumbnailProcessor;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during thumbnail post-processing.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Image could not be decoded.
    #[error("failed to decode thumbnail {path}: {reason}")]
    DecodeFailed { path: PathBuf, reason: String },

    /// Processed image could not be written back.
    #[error("failed to encode thumbnail {path}: {reason}")]
    EncodeFailed { path: PathBuf, reason: String },

    /// I/O error while reading or replacing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Normalizes a thumbnail file in place to the delivery target's requirements.
#[async_trait]
pub trait ThumbnailProcessor: Send + Sync {
    /// Center-crops to a square and resizes so neither side exceeds
    /// `max_dimension`. No-op if the file is already compliant.
    async fn normalize(&self, path: &Path, max_dimension: u32) -> Result<(), ThumbnailError>;
}
