//! API layer - HTTP handlers and routing
//!
//! It includes:
//! - Shortcode listing, tag and scan endpoints
//! - Display settings endpoints
//! - Column extension endpoints
//! - Admin HTML pages (listing table and settings form)

pub mod admin_pages;
pub mod columns;
pub mod common;
pub mod middleware;
pub mod responses;
pub mod settings;
pub mod shortcodes;
pub mod templates;


use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the JSON API router
pub fn build_api_router() -> Router<AppState> {
    let admin_routes = Router::new()
        .merge(shortcodes::router())
        .merge(settings::router())
        .merge(columns::router());

    Router::new().nest("/admin", admin_routes)
}

/// Build the complete router with middleware
///
/// Fails when `cors_origin` is not a valid header value.
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .merge(admin_pages::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
