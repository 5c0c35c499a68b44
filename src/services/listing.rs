//! Listing coordinator
//!
//! Turns a [`ListingFilter`] into one page of [`ListingRow`]s: resolves the
//! content types, asks the store for candidate items, then runs the shortcode
//! matcher over each body.

use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::db::repositories::{ContentQuery, ContentRepository};
use crate::models::{ListParams, ListingFilter, ListingRow, PagedResult};
use crate::plugin::{is_valid_tag_name, ShortcodeMatcher};
use crate::services::content_types::ContentTypeService;
use crate::services::sanitize::sanitize_text_field;

/// Listing errors
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Content query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

pub struct ListingCoordinator {
    content: Arc<dyn ContentRepository>,
    content_types: Arc<ContentTypeService>,
    matcher: ShortcodeMatcher,
}

impl ListingCoordinator {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        content_types: Arc<ContentTypeService>,
        matcher: ShortcodeMatcher,
    ) -> Self {
        Self {
            content,
            content_types,
            matcher,
        }
    }

    /// Registered shortcode names, for filter choices
    pub fn tags(&self) -> Vec<String> {
        self.matcher.registry().tags()
    }

    /// Build one page of the listing.
    ///
    /// Items whose body contains no occurrence are still listed with an empty
    /// shortcode list. An empty type selection yields an empty page without
    /// querying the store.
    pub async fn list_page(
        &self,
        filter: &ListingFilter,
        params: &ListParams,
    ) -> Result<PagedResult<ListingRow>, ListingError> {
        let tag = normalize_tag(filter.tag.as_deref())?;

        let types = self
            .content_types
            .resolve(&filter.content_types)
            .await
            .map_err(|e| {
                error!("Failed to resolve content types: {:#}", e);
                ListingError::QueryFailed(e.to_string())
            })?;
        if types.is_empty() {
            return Ok(PagedResult::empty(params));
        }

        let query = ContentQuery {
            content_types: types.iter().map(|t| t.name.clone()).collect(),
            body_contains: tag.as_ref().map(|t| format!("[{}]", t)),
            sort_field: filter.sort_field,
            sort_direction: filter.sort_direction,
            offset: params.offset(),
            limit: params.limit(),
        };

        let page = self.content.query(&query).await.map_err(|e| {
            error!("Content query failed: {:#}", e);
            ListingError::QueryFailed(e.to_string())
        })?;

        let rows = page
            .items
            .into_iter()
            .map(|item| {
                let shortcodes = self
                    .matcher
                    .find_shortcodes(&item.body, tag.as_deref())
                    .into_iter()
                    .map(|o| o.text)
                    .collect();
                let content_type_label = types
                    .iter()
                    .find(|t| t.name == item.content_type)
                    .map(|t| t.label.clone())
                    .unwrap_or_else(|| item.content_type.clone());

                ListingRow {
                    id: item.id,
                    title: item.title,
                    content_type: item.content_type,
                    content_type_label,
                    shortcodes,
                }
            })
            .collect();

        Ok(PagedResult::new(rows, page.total, params))
    }
}

/// Sanitise a requested tag. Blank means no tag filter.
fn normalize_tag(tag: Option<&str>) -> Result<Option<String>, ListingError> {
    let Some(raw) = tag else {
        return Ok(None);
    };

    let tag = sanitize_text_field(raw);
    if tag.is_empty() {
        return Ok(None);
    }
    if !is_valid_tag_name(&tag) {
        return Err(ListingError::InvalidFilter(format!(
            "'{}' is not a valid shortcode name",
            tag
        )));
    }
    Ok(Some(tag))
}
