//! Content items and content types as held by the host content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document in the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    /// Content-type key, e.g. `post`
    pub content_type: String,
    /// Raw, unrendered body
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A registered content type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType {
    /// Stable key, e.g. `post`
    pub name: String,
    /// Display label, e.g. `Posts`
    pub label: String,
}

impl ContentType {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Input for adding a document to the store
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentItemInput {
    pub title: String,
    pub content_type: String,
    pub body: String,
    /// Defaults to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CreateContentItemInput {
    pub fn new(
        title: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content_type: content_type.into(),
            body: body.into(),
            created_at: None,
        }
    }

    /// Set an explicit creation time
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
