//! Mock thumbnail processor for testing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::thumbnail::{ThumbnailError, ThumbnailProcessor};

/// Mock implementation of the ThumbnailProcessor trait.
#[derive(Debug)]
pub struct MockThumbnailProcessor {
    /// Paths handed to `normalize`.
    calls: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<ThumbnailError>>>,
}

impl Default for MockThumbnailProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockThumbnailProcessor {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn recorded_paths(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    pub async fn set_next_error(&self, error: ThumbnailError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl ThumbnailProcessor for MockThumbnailProcessor {
    async fn normalize(&self, path: &Path, _max_dimension: u32) -> Result<(), ThumbnailError> {
        self.calls.write().await.push(path.to_path_buf());
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(())
    }
}
