//! Bot settings API handlers.
//!
//! The bot token is write-only through this API: responses only reveal
//! whether one is configured.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tubecast_core::BotSettings;

use crate::state::AppState;

/// Settings as exposed to clients, token redacted
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub bot_token_set: bool,
    pub chat_id: String,
}

/// Request body for updating settings
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsBody {
    /// New bot token; omit to keep the current one
    pub bot_token: Option<String>,
    /// New chat id; omit to keep the current one
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsErrorResponse {
    pub error: String,
}

fn redact(settings: &BotSettings) -> SettingsResponse {
    SettingsResponse {
        bot_token_set: !settings.bot_token.is_empty(),
        chat_id: settings.chat_id.clone(),
    }
}

/// Get the current delivery settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(redact(&state.settings().load()))
}

/// Update delivery settings; takes effect on the next delivery
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSettingsBody>,
) -> Result<Json<SettingsResponse>, (StatusCode, Json<SettingsErrorResponse>)> {
    let mut settings = state.settings().load();
    if let Some(bot_token) = body.bot_token {
        settings.bot_token = bot_token;
    }
    if let Some(chat_id) = body.chat_id {
        settings.chat_id = chat_id;
    }

    match state.settings().save(&settings) {
        Ok(()) => Ok(Json(redact(&settings))),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SettingsErrorResponse {
                error: err.to_string(),
            }),
        )),
    }
}
