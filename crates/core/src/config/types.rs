use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ytdlp: YtdlpConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Acquisition tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YtdlpConfig {
    /// Path to (or name of) the yt-dlp binary.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Root of per-job scratch directories.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

impl Default for YtdlpConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            scratch_dir: default_scratch_dir(),
            audio_format: default_audio_format(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("tubecast")
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

/// Delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Where the runtime-mutable bot settings file lives.
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
    /// Overridable for tests against a local stub.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            api_base: default_api_base(),
        }
    }
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("settings.toml")
}

fn default_api_base() -> String {
    crate::delivery::DEFAULT_API_BASE.to_string()
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tubecast.db")
}

/// Thumbnail post-processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    /// Maximum side length after cropping to a square.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
        }
    }
}

fn default_max_dimension() -> u32 {
    320
}
