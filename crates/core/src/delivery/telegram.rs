//! Telegram Bot API delivery client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::{DeliveryClient, DeliveryError};
use crate::acquirer::Acquisition;
use crate::settings::{BotSettings, SettingsStore};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Client state is rebuilt whenever the stored settings change, so token and
/// chat id updates take effect on the next send without a restart.
enum ClientState {
    Uninitialized,
    Ready {
        http: reqwest::Client,
        settings: BotSettings,
    },
}

/// Delivery client posting audio via the Bot API `sendAudio` method.
pub struct TelegramDelivery {
    settings_store: Arc<dyn SettingsStore>,
    api_base: String,
    state: Mutex<ClientState>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramDelivery {
    pub fn new(settings_store: Arc<dyn SettingsStore>, api_base: impl Into<String>) -> Self {
        Self {
            settings_store,
            api_base: api_base.into(),
            state: Mutex::new(ClientState::Uninitialized),
        }
    }

    /// Re-reads settings and rebuilds the HTTP client when they changed since
    /// the last send.
    async fn current_settings(&self) -> Result<(reqwest::Client, BotSettings), DeliveryError> {
        let fresh = self.settings_store.load();
        if !fresh.is_complete() {
            return Err(DeliveryError::MissingSettings);
        }

        let mut state = self.state.lock().await;
        match &*state {
            ClientState::Ready { http, settings } if *settings == fresh => {
                Ok((http.clone(), settings.clone()))
            }
            _ => {
                debug!("delivery settings changed, rebuilding client");
                let http = reqwest::Client::builder()
                    .timeout(UPLOAD_TIMEOUT)
                    .build()?;
                *state = ClientState::Ready {
                    http: http.clone(),
                    settings: fresh.clone(),
                };
                Ok((http, fresh))
            }
        }
    }

    /// Builds a multipart part that streams the file instead of loading it
    /// into memory; audio files can run to hundreds of megabytes.
    async fn file_part(path: &std::path::Path) -> Result<reqwest::multipart::Part, DeliveryError> {
        let file = tokio::fs::File::open(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        Ok(reqwest::multipart::Part::stream(body).file_name(file_name))
    }
}

#[async_trait]
impl DeliveryClient for TelegramDelivery {
    async fn send_media(&self, acquisition: &Acquisition) -> Result<(), DeliveryError> {
        let (http, settings) = self.current_settings().await?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", settings.chat_id.clone())
            .text("title", acquisition.title.clone())
            .part("audio", Self::file_part(&acquisition.media_path).await?);

        if let Some(thumb) = &acquisition.thumbnail_path {
            form = form.part("thumbnail", Self::file_part(thumb).await?);
        }

        let url = format!("{}/bot{}/sendAudio", self.api_base, settings.bot_token);
        let response = http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body: ApiResponse = response.json().await.unwrap_or(ApiResponse {
            ok: status.is_success(),
            description: None,
        });

        if !status.is_success() || !body.ok {
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        info!(
            video_id = acquisition.video_id.as_str(),
            "delivered {}", acquisition.title
        );
        Ok(())
    }
}
