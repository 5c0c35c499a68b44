//! Shared API response types

use serde::{Deserialize, Serialize};

use crate::models::{ListingRow, PagedResult};
use crate::plugin::ShortcodeOccurrence;
use crate::services::Column;

/// One page of the shortcode listing
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub items: Vec<ListingRow>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl From<PagedResult<ListingRow>> for ListingResponse {
    fn from(result: PagedResult<ListingRow>) -> Self {
        let total_pages = result.total_pages();
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// A content type offered by the locator
#[derive(Debug, Serialize, Deserialize)]
pub struct ContentTypeInfo {
    pub name: String,
    pub label: String,
    /// Whether the shortcode column is shown for this type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ContentTypeListResponse {
    pub content_types: Vec<ContentTypeInfo>,
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub occurrences: Vec<ShortcodeOccurrence>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub display_column: Vec<String>,
    pub content_types: Vec<ContentTypeInfo>,
    /// Token to send back with the next update
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub struct SaveSettingsResponse {
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct ColumnsResponse {
    pub content_type: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Serialize)]
pub struct ItemShortcodesResponse {
    pub id: i64,
    pub shortcodes: Vec<String>,
    pub html: String,
}
