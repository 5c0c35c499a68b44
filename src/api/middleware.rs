//! Shared API plumbing
//!
//! - [`AppState`], built once at start-up and cloned into every handler
//! - [`ApiError`], the JSON error envelope with its status mapping

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::templates::{AdminTemplates, TemplateError};
use crate::config::{Config, LocatorConfig};
use crate::db::repositories::{SqlxContentRepository, SqlxSettingsRepository};
use crate::db::DynDatabasePool;
use crate::plugin::{HookManager, ShortcodeMatcher, ShortcodeRegistry};
use crate::services::{
    ColumnService, ColumnServiceError, ContentTypeService, DisplaySettingsGate,
    ListingCoordinator, ListingError, NonceService, SettingsServiceError, StoreContentTypes,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub locator_config: Arc<LocatorConfig>,
    pub hook_manager: Arc<HookManager>,
    pub shortcode_registry: Arc<ShortcodeRegistry>,
    pub content_types: Arc<ContentTypeService>,
    pub listing: Arc<ListingCoordinator>,
    pub display_settings: Arc<DisplaySettingsGate>,
    pub columns: Arc<ColumnService>,
    pub nonces: Arc<NonceService>,
    pub templates: Arc<AdminTemplates>,
}

impl AppState {
    /// Wire repositories and services over `pool`
    pub fn new(pool: DynDatabasePool, config: &Config) -> Result<Self> {
        let locator = &config.locator;
        let hook_manager = Arc::new(HookManager::new());

        let shortcode_registry = Arc::new(ShortcodeRegistry::with_core_tags());
        for tag in &locator.shortcodes {
            shortcode_registry.register(tag);
        }
        let matcher = ShortcodeMatcher::new(shortcode_registry.clone());

        let content_repo = SqlxContentRepository::boxed(pool.clone());
        let settings_repo = SqlxSettingsRepository::boxed(pool.clone());

        let content_types = Arc::new(ContentTypeService::new(
            Arc::new(StoreContentTypes::new(content_repo.clone())),
            hook_manager.clone(),
            locator.excluded_content_types.clone(),
        ));
        let listing = Arc::new(ListingCoordinator::new(
            content_repo.clone(),
            content_types.clone(),
            matcher.clone(),
        ));
        let display_settings = Arc::new(DisplaySettingsGate::new(settings_repo));
        let columns = Arc::new(ColumnService::new(
            display_settings.clone(),
            content_repo,
            matcher,
            hook_manager.clone(),
        ));
        let nonces = Arc::new(NonceService::new(
            locator.nonce_secret.as_deref(),
            locator.nonce_lifetime_seconds,
        ));

        Ok(Self {
            pool,
            locator_config: Arc::new(locator.clone()),
            hook_manager,
            shortcode_registry,
            content_types,
            listing,
            display_settings,
            columns,
            nonces,
            templates: Arc::new(AdminTemplates::new()?),
        })
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ListingError> for ApiError {
    fn from(e: ListingError) -> Self {
        match e {
            ListingError::InvalidFilter(_) => Self::validation_error(e.to_string()),
            ListingError::QueryFailed(_) => Self::internal_error(e.to_string()),
        }
    }
}

impl From<SettingsServiceError> for ApiError {
    fn from(e: SettingsServiceError) -> Self {
        Self::internal_error(e.to_string())
    }
}

impl From<ColumnServiceError> for ApiError {
    fn from(e: ColumnServiceError) -> Self {
        Self::internal_error(e.to_string())
    }
}

impl From<TemplateError> for ApiError {
    fn from(e: TemplateError) -> Self {
        Self::internal_error(e.to_string())
    }
}
