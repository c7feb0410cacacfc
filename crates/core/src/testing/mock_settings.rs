//! Mock settings store for testing.

use std::sync::Mutex;

use crate::settings::{BotSettings, SettingsError, SettingsStore};

/// Mock implementation of the SettingsStore trait.
#[derive(Debug)]
pub struct MockSettingsStore {
    settings: Mutex<BotSettings>,
    saves: Mutex<usize>,
}

impl MockSettingsStore {
    pub fn new(settings: BotSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saves: Mutex::new(0),
        }
    }

    /// Replace the stored settings, as a concurrent API update would.
    pub fn set(&self, settings: BotSettings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl SettingsStore for MockSettingsStore {
    fn load(&self) -> BotSettings {
        self.settings.lock().unwrap().clone()
    }

    fn save(&self, settings: &BotSettings) -> Result<(), SettingsError> {
        *self.settings.lock().unwrap() = settings.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
