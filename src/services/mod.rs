//! Services layer
//!
//! Business logic over the repositories and the shortcode matcher:
//! - Content types offered to the locator
//! - The paginated shortcode listing
//! - Display settings and the column they control
//! - Request nonces and input sanitisation

pub mod columns;
pub mod content_types;
pub mod listing;
pub mod nonce;
pub mod sanitize;
pub mod settings;

pub use columns::{cell_html, default_columns, Column, ColumnService, ColumnServiceError};
pub use content_types::{ContentTypeRegistry, ContentTypeService, StoreContentTypes};
pub use listing::{ListingCoordinator, ListingError};
pub use nonce::NonceService;
pub use sanitize::{html_escape, sanitize_text_field};
pub use settings::{DisplaySettingsGate, SettingsServiceError};
