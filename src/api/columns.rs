//! Column extension endpoints
//!
//! What the host's per-type listings ask for when they draw the
//! "Shortcodes Located" column.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ColumnsResponse, ItemShortcodesResponse};
use crate::services::{cell_html, default_columns};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/columns/{content_type}", get(get_columns))
        .route("/items/{id}/shortcodes", get(get_item_shortcodes))
}

/// GET /api/v1/admin/columns/{content_type}
async fn get_columns(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
) -> Json<ColumnsResponse> {
    let columns = state
        .columns
        .columns_for(&content_type, default_columns())
        .await;

    Json(ColumnsResponse {
        content_type,
        columns,
    })
}

/// GET /api/v1/admin/items/{id}/shortcodes
async fn get_item_shortcodes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ItemShortcodesResponse>, ApiError> {
    let shortcodes = state
        .columns
        .render_cell(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content item not found"))?;

    let html = cell_html(&shortcodes);

    Ok(Json(ItemShortcodesResponse { id, shortcodes, html }))
}
