//! Common API utilities and shared types
//!
//! Query parameter shapes for the listing endpoints and the helpers that turn
//! them into a [`ListingFilter`].

use serde::Deserialize;

use crate::models::{ContentTypeFilter, ListingFilter, SortDirection, SortField};

// ============================================================================
// Pagination Defaults
// ============================================================================

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

// ============================================================================
// Query Types
// ============================================================================

/// Query parameters of `GET /api/v1/admin/shortcodes`
#[derive(Debug, Default, Deserialize)]
pub struct ShortcodeListQuery {
    /// Comma-separated content type keys, or `all`
    pub content_type: Option<String>,
    pub shortcode: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    /// Falls back to the configured page size
    pub per_page: Option<u32>,
}

impl ShortcodeListQuery {
    pub fn to_filter(&self) -> ListingFilter {
        ListingFilter {
            sort_field: parse_sort_field(self.orderby.as_deref()),
            sort_direction: parse_sort_direction(self.order.as_deref()),
            content_types: parse_content_types(self.content_type.as_deref()),
            tag: self.shortcode.clone(),
        }
    }
}

/// Query parameters of the admin listing page, named as the host's list
/// tables name them
#[derive(Debug, Default, Deserialize)]
pub struct ListingPageQuery {
    pub filter_post_type: Option<String>,
    pub filter_shortcode: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
    /// Kept as text so a malformed value falls back to the first page
    pub paged: Option<String>,
}

impl ListingPageQuery {
    pub fn to_filter(&self) -> ListingFilter {
        ListingFilter {
            sort_field: parse_sort_field(self.orderby.as_deref()),
            sort_direction: parse_sort_direction(self.order.as_deref()),
            content_types: ContentTypeFilter::from_param(self.filter_post_type.as_deref()),
            tag: self.filter_shortcode.clone(),
        }
    }

    pub fn page(&self) -> u32 {
        self.paged
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or_else(default_page)
    }
}

// ============================================================================
// Parsing Helpers
// ============================================================================

/// Unknown or missing values sort by date
pub fn parse_sort_field(value: Option<&str>) -> SortField {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// Unknown or missing values sort ascending
pub fn parse_sort_direction(value: Option<&str>) -> SortDirection {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// `None`, blank and `all` select every type; otherwise a comma-separated
/// list of keys.
pub fn parse_content_types(value: Option<&str>) -> ContentTypeFilter {
    let Some(value) = value.map(str::trim) else {
        return ContentTypeFilter::All;
    };
    if value.is_empty() || value == "all" {
        return ContentTypeFilter::All;
    }

    ContentTypeFilter::only(
        value
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty()),
    )
}
