//! Admin HTML pages
//!
//! - `/admin/shortcode-locator`: the shortcode listing table
//! - `/admin/shortcode-locator/settings`: which content types show the
//!   shortcode column

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tera::Context as TeraContext;
use tracing::warn;

use crate::api::common::ListingPageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ContentTypeInfo;
use crate::models::{ListParams, PagedResult, SortDirection, SortField};
use crate::services::nonce::SETTINGS_ACTION;
use crate::services::ListingError;

pub const LISTING_PATH: &str = "/admin/shortcode-locator";
pub const SETTINGS_PATH: &str = "/admin/shortcode-locator/settings";

const LISTING_TITLE: &str = "Shortcode Locator";
const SETTINGS_TITLE: &str = "Shortcode Locator Settings";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(LISTING_PATH, get(listing_page))
        .route(SETTINGS_PATH, get(settings_page).post(save_settings))
}

// ============================================================================
// Listing
// ============================================================================

/// A header cell of the listing table
#[derive(Debug, Serialize)]
struct HeaderColumn {
    key: &'static str,
    label: &'static str,
    /// Link that sorts by this column; `None` for unsortable columns
    url: Option<String>,
    /// `asc`/`desc` when the table is sorted by this column
    sorted: String,
}

/// Sortable column: key, label, field, and whether the first click sorts
/// descending
const SORTABLE: [(&str, &str, SortField, bool); 2] = [
    ("title", "Post Title", SortField::Title, true),
    ("post_type", "Post Type", SortField::ContentType, false),
];

/// GET /admin/shortcode-locator
async fn listing_page(
    State(state): State<AppState>,
    Query(query): Query<ListingPageQuery>,
) -> Result<Html<String>, ApiError> {
    let filter = query.to_filter();
    let params = ListParams::new(query.page(), state.locator_config.per_page);

    let (page, error) = match state.listing.list_page(&filter, &params).await {
        Ok(page) => (page, None),
        Err(e @ ListingError::InvalidFilter(_)) => (PagedResult::empty(&params), Some(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let content_types = state
        .content_types
        .content_types()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let links = ListingLinks::from_query(&query);
    let mut columns: Vec<HeaderColumn> = SORTABLE
        .iter()
        .map(|&(key, label, field, desc_first)| {
            let active = query.orderby.is_some() && filter.sort_field == field;
            let direction = match (active, desc_first) {
                (true, _) => filter.sort_direction.reversed(),
                (false, true) => SortDirection::Desc,
                (false, false) => SortDirection::Asc,
            };
            HeaderColumn {
                key,
                label,
                url: Some(links.sorted_by(field, direction)),
                sorted: if active {
                    filter.sort_direction.to_string()
                } else {
                    String::new()
                },
            }
        })
        .collect();
    columns.push(HeaderColumn {
        key: "shortcodes",
        label: "Shortcodes Used",
        url: None,
        sorted: String::new(),
    });

    let total_pages = page.total_pages();
    let prev_url = page.has_prev().then(|| links.paged(page.page - 1));
    let next_url = page.has_next().then(|| links.paged(page.page + 1));

    let mut context = TeraContext::new();
    context.insert("page_title", LISTING_TITLE);
    context.insert("notice", &None::<String>);
    context.insert("error", &error);
    context.insert("base_url", LISTING_PATH);
    context.insert("content_types", &content_types);
    context.insert("selected_type", query.filter_post_type.as_deref().unwrap_or(""));
    context.insert("tags", &state.listing.tags());
    context.insert("selected_tag", query.filter_shortcode.as_deref().unwrap_or(""));
    context.insert("columns", &columns);
    context.insert("rows", &page.items);
    context.insert("total", &page.total);
    context.insert("page", &page.page);
    context.insert("total_pages", &total_pages);
    context.insert("prev_url", &prev_url);
    context.insert("next_url", &next_url);

    Ok(Html(state.templates.render("listing.html", &context)?))
}

/// Builds listing URLs that keep the active filters
struct ListingLinks {
    filter_post_type: String,
    filter_shortcode: String,
    orderby: String,
    order: String,
}

impl ListingLinks {
    fn from_query(query: &ListingPageQuery) -> Self {
        Self {
            filter_post_type: query.filter_post_type.clone().unwrap_or_default(),
            filter_shortcode: query.filter_shortcode.clone().unwrap_or_default(),
            orderby: query.orderby.clone().unwrap_or_default(),
            order: query.order.clone().unwrap_or_default(),
        }
    }

    /// First page sorted by `field`
    fn sorted_by(&self, field: SortField, direction: SortDirection) -> String {
        build_url(&[
            ("filter_post_type", self.filter_post_type.as_str()),
            ("filter_shortcode", self.filter_shortcode.as_str()),
            ("orderby", &field.to_string()),
            ("order", &direction.to_string()),
        ])
    }

    fn paged(&self, page: u32) -> String {
        build_url(&[
            ("filter_post_type", self.filter_post_type.as_str()),
            ("filter_shortcode", self.filter_shortcode.as_str()),
            ("orderby", self.orderby.as_str()),
            ("order", self.order.as_str()),
            ("paged", &page.to_string()),
        ])
    }
}

/// Listing URL with the non-empty parameters
fn build_url(params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        LISTING_PATH.to_string()
    } else {
        format!("{}?{}", LISTING_PATH, query)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// GET /admin/shortcode-locator/settings
async fn settings_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render_settings(&state, None, None).await.map(Html)
}

/// POST /admin/shortcode-locator/settings
async fn save_settings(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let form = SettingsForm::parse(&body);

    if !state.nonces.verify(SETTINGS_ACTION, &form.nonce) {
        warn!("Settings form submitted with an invalid nonce");
        return Ok((
            StatusCode::FORBIDDEN,
            Html("<p>The link you followed has expired.</p>".to_string()),
        )
            .into_response());
    }

    let html = if state.display_settings.save(&form.display_column).await {
        render_settings(&state, Some("Settings have been saved."), None).await?
    } else {
        render_settings(&state, None, Some("Settings could not be saved.")).await?
    };
    Ok(Html(html).into_response())
}

async fn render_settings(
    state: &AppState,
    notice: Option<&str>,
    error: Option<&str>,
) -> Result<String, ApiError> {
    let settings = state.display_settings.settings().await?;
    let content_types: Vec<ContentTypeInfo> = state
        .content_types
        .content_types()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .into_iter()
        .map(|t| ContentTypeInfo {
            enabled: Some(settings.is_enabled(&t.name)),
            name: t.name,
            label: t.label,
        })
        .collect();

    let mut context = TeraContext::new();
    context.insert("page_title", SETTINGS_TITLE);
    context.insert("notice", &notice);
    context.insert("error", &error);
    context.insert("nonce", &state.nonces.create(SETTINGS_ACTION));
    context.insert("content_types", &content_types);

    Ok(state.templates.render("settings.html", &context)?)
}

/// Fields of the settings form
#[derive(Debug, Default, PartialEq, Eq)]
struct SettingsForm {
    nonce: String,
    display_column: Vec<String>,
}

impl SettingsForm {
    /// Parse an `application/x-www-form-urlencoded` body. `display_column[]`
    /// repeats once per checked box.
    fn parse(body: &str) -> Self {
        let mut form = Self::default();

        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (Some(key), Some(value)) = (decode_form_component(key), decode_form_component(value))
            else {
                warn!("Skipping undecodable settings form field");
                continue;
            };

            match key.as_str() {
                "_wpnonce" => form.nonce = value,
                "display_column[]" | "display_column" => form.display_column.push(value),
                _ => {}
            }
        }

        form
    }
}

fn decode_form_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}
