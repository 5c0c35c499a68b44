//! Shortcode listing API endpoints

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::ShortcodeListQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{
    ContentTypeInfo, ContentTypeListResponse, ListingResponse, ScanResponse, TagListResponse,
};
use crate::models::ListParams;
use crate::plugin::ShortcodeMatcher;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shortcodes", get(list_shortcodes))
        .route("/shortcodes/tags", get(list_tags))
        .route("/shortcodes/scan", post(scan))
        .route("/content-types", get(list_content_types))
}

/// Request body for an ad-hoc scan
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub text: String,
    #[serde(default)]
    pub shortcode: Option<String>,
}

/// GET /api/v1/admin/shortcodes
async fn list_shortcodes(
    State(state): State<AppState>,
    Query(query): Query<ShortcodeListQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    let per_page = query.per_page.unwrap_or(state.locator_config.per_page);
    let params = ListParams::new(query.page, per_page);

    let page = state.listing.list_page(&query.to_filter(), &params).await?;
    Ok(Json(page.into()))
}

/// GET /api/v1/admin/shortcodes/tags
async fn list_tags(State(state): State<AppState>) -> Json<TagListResponse> {
    Json(TagListResponse {
        tags: state.listing.tags(),
    })
}

/// POST /api/v1/admin/shortcodes/scan
async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Json<ScanResponse> {
    let matcher = ShortcodeMatcher::new(state.shortcode_registry.clone());
    let tag = request
        .shortcode
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    Json(ScanResponse {
        occurrences: matcher.find_shortcodes(&request.text, tag),
    })
}

/// GET /api/v1/admin/content-types
async fn list_content_types(
    State(state): State<AppState>,
) -> Result<Json<ContentTypeListResponse>, ApiError> {
    let types = state
        .content_types
        .content_types()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(ContentTypeListResponse {
        content_types: types
            .into_iter()
            .map(|t| ContentTypeInfo {
                name: t.name,
                label: t.label,
                enabled: None,
            })
            .collect(),
    }))
}
