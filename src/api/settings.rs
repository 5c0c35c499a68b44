//! Display settings API endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ContentTypeInfo, SaveSettingsResponse, SettingsResponse};
use crate::services::nonce::SETTINGS_ACTION;

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

/// Request body for replacing the display settings
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub display_column: Vec<String>,
    pub nonce: String,
}

/// GET /api/v1/admin/settings
async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.display_settings.settings().await?;
    let types = state
        .content_types
        .content_types()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let content_types = types
        .into_iter()
        .map(|t| ContentTypeInfo {
            enabled: Some(settings.is_enabled(&t.name)),
            name: t.name,
            label: t.label,
        })
        .collect();

    Ok(Json(SettingsResponse {
        display_column: settings.display_column.into_iter().collect(),
        content_types,
        nonce: state.nonces.create(SETTINGS_ACTION),
    }))
}

/// PUT /api/v1/admin/settings
async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SaveSettingsResponse>, ApiError> {
    if !state.nonces.verify(SETTINGS_ACTION, &request.nonce) {
        return Err(ApiError::forbidden("Invalid or expired nonce"));
    }

    let saved = state.display_settings.save(&request.display_column).await;
    Ok(Json(SaveSettingsResponse { saved }))
}
