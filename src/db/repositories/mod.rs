//! Database repositories
//!
//! Each repository is a trait plus an sqlx implementation that dispatches on
//! the pool's driver.

pub mod content;
pub mod settings;

pub use content::{ContentPage, ContentQuery, ContentRepository, SqlxContentRepository};
pub use settings::{Setting, SettingsRepository, SqlxSettingsRepository};
