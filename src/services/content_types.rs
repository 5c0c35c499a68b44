//! Content types offered by the locator
//!
//! The host's registered types minus an exclusion list. Exclusions start from
//! configuration and pass through the
//! [`EXCLUDED_POST_TYPES`](crate::plugin::hook_names::EXCLUDED_POST_TYPES) hook.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::db::repositories::ContentRepository;
use crate::models::{ContentType, ContentTypeFilter};
use crate::plugin::{hook_names, HookManager};

/// Read-only view of the host's content types
#[async_trait]
pub trait ContentTypeRegistry: Send + Sync {
    /// All registered types, in registry order
    async fn content_types(&self) -> Result<Vec<ContentType>>;
}

/// Registry backed by the content store's `content_types` table
pub struct StoreContentTypes {
    repo: Arc<dyn ContentRepository>,
}

impl StoreContentTypes {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ContentTypeRegistry for StoreContentTypes {
    async fn content_types(&self) -> Result<Vec<ContentType>> {
        self.repo.list_types().await
    }
}

/// Non-excluded content types
pub struct ContentTypeService {
    registry: Arc<dyn ContentTypeRegistry>,
    hooks: Arc<HookManager>,
    excluded: Vec<String>,
}

impl ContentTypeService {
    pub fn new(
        registry: Arc<dyn ContentTypeRegistry>,
        hooks: Arc<HookManager>,
        excluded: Vec<String>,
    ) -> Self {
        Self {
            registry,
            hooks,
            excluded,
        }
    }

    /// Configured exclusions after the filter hook has run
    pub fn excluded_types(&self) -> Vec<String> {
        let output = self
            .hooks
            .trigger(hook_names::EXCLUDED_POST_TYPES, Value::from(self.excluded.clone()));

        match output {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(key) => Some(key),
                    other => {
                        warn!("Ignoring non-string excluded content type: {}", other);
                        None
                    }
                })
                .collect(),
            other => {
                warn!(
                    "Hook '{}' returned {} instead of an array; using configured exclusions",
                    hook_names::EXCLUDED_POST_TYPES,
                    other
                );
                self.excluded.clone()
            }
        }
    }

    /// Registered types minus exclusions, in registry order
    pub async fn content_types(&self) -> Result<Vec<ContentType>> {
        let excluded = self.excluded_types();
        let types = self.registry.content_types().await?;
        Ok(types
            .into_iter()
            .filter(|t| !excluded.contains(&t.name))
            .collect())
    }

    /// Types a listing filter covers. Unknown and excluded keys are dropped.
    pub async fn resolve(&self, filter: &ContentTypeFilter) -> Result<Vec<ContentType>> {
        let available = self.content_types().await?;
        Ok(match filter {
            ContentTypeFilter::All => available,
            ContentTypeFilter::Only(keys) => available
                .into_iter()
                .filter(|t| keys.contains(&t.name))
                .collect(),
        })
    }
}
