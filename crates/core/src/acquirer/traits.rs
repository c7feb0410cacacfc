//! Acquirer abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{AcquireError, Acquisition};
use crate::media::{SourceUrl, VideoId};

/// Fetches and transcodes one source into a local audio artifact.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Acquires the resource, forwarding download percentages to `progress`.
    ///
    /// `custom_title` overrides the source title for the artifact filename.
    /// On any error path the implementation cleans up its own scratch
    /// artifacts before returning.
    async fn acquire(
        &self,
        url: &SourceUrl,
        video_id: &VideoId,
        custom_title: Option<&str>,
        progress: mpsc::Sender<f32>,
        cancel: &CancellationToken,
    ) -> Result<Acquisition, AcquireError>;
}
