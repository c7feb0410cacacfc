use std::sync::Arc;

use tubecast_core::{DownloadQueue, HistoryStore, SettingsStore};

/// Shared application state
pub struct AppState {
    queue: Arc<DownloadQueue>,
    history: Arc<dyn HistoryStore>,
    settings: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(
        queue: Arc<DownloadQueue>,
        history: Arc<dyn HistoryStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            queue,
            history,
            settings,
        }
    }

    pub fn queue(&self) -> &Arc<DownloadQueue> {
        &self.queue
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }
}
