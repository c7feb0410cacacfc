//! Acquisition result types.

use std::path::PathBuf;

use serde::Serialize;

use crate::media::VideoId;

/// A successfully acquired artifact.
///
/// Paths reference temporary storage; ownership transfers to the caller of the
/// workflow, which deletes them after delivery, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acquisition {
    pub video_id: VideoId,
    /// Title derived from the normalized media filename.
    pub title: String,
    /// Audio artifact in scratch storage.
    pub media_path: PathBuf,
    /// Normalized thumbnail, when one was produced and post-processing
    /// succeeded.
    pub thumbnail_path: Option<PathBuf>,
}
