//! Data models
//!
//! - Content store entities (ContentItem, ContentType)
//! - Listing criteria, rows and pagination
//! - Persisted display settings

mod content;
mod listing;
mod settings;

pub use content::{ContentItem, ContentType, CreateContentItemInput};
pub use listing::{
    ContentTypeFilter, ListParams, ListingFilter, ListingRow, PagedResult, SortDirection,
    SortField, MAX_PER_PAGE,
};
pub use settings::DisplaySettings;
