//! Display settings model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Content types that show the shortcode column on their listings.
///
/// Stored as `{"display_column": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub display_column: BTreeSet<String>,
}

impl DisplaySettings {
    pub fn new<I, S>(content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            display_column: content_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the column is enabled for `content_type`
    pub fn is_enabled(&self, content_type: &str) -> bool {
        self.display_column.contains(content_type)
    }
}
