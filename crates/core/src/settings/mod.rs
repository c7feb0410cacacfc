//! Runtime-mutable bot settings.
//!
//! Delivery credentials live outside the main configuration file so they can
//! be updated through the API without a restart. The store is re-read by the
//! delivery client on every send.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::ErrorCategory;

/// Credentials and destination for the delivery target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotSettings {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

impl BotSettings {
    /// True when both fields are present and delivery can be attempted.
    pub fn is_complete(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

/// Errors that can occur while persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Failure
    }
}

/// Load and save access to the bot settings.
pub trait SettingsStore: Send + Sync {
    /// Returns the current settings. A missing or unreadable file yields the
    /// defaults rather than an error; delivery then fails with a
    /// configuration error at send time.
    fn load(&self) -> BotSettings;

    fn save(&self, settings: &BotSettings) -> Result<(), SettingsError>;
}

/// TOML-file backed settings store.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> BotSettings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BotSettings::default(),
            Err(e) => {
                warn!("failed to read settings file {}: {}", self.path.display(), e);
                return BotSettings::default();
            }
        };
        match toml::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "settings file {} is not valid TOML, using defaults: {}",
                    self.path.display(),
                    e
                );
                BotSettings::default()
            }
        }
    }

    fn save(&self, settings: &BotSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(settings)?;

        // The file holds a live credential: write to a sibling temp file
        // created owner-only, then rename over the target, so the contents
        // are never readable by other users at any point.
        let tmp = self.path.with_extension("toml.tmp");
        {
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            file.write_all(raw.as_bytes())?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
