//! Filter hooks
//!
//! Handlers registered under a hook name receive a JSON value and may replace
//! it. Handlers run in priority order (lower first).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Hook callback type
pub type HookCallback = Arc<dyn Fn(&mut Value) -> Option<Value> + Send + Sync>;

/// Hook priority (lower = earlier)
pub const PRIORITY_EARLY: i32 = -100;
pub const PRIORITY_DEFAULT: i32 = 0;
pub const PRIORITY_LATE: i32 = 100;

struct HookHandler {
    callback: HookCallback,
    priority: i32,
}

/// Registry of hook handlers
pub struct HookManager {
    hooks: RwLock<HashMap<String, Vec<HookHandler>>>,
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HookManager {
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
        }
    }

    /// Register a hook handler
    pub fn register<F>(&self, name: &str, callback: F, priority: i32)
    where
        F: Fn(&mut Value) -> Option<Value> + Send + Sync + 'static,
    {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        let handlers = hooks.entry(name.to_string()).or_default();

        handlers.push(HookHandler {
            callback: Arc::new(callback),
            priority,
        });

        // Stable sort keeps registration order within a priority
        handlers.sort_by_key(|h| h.priority);

        debug!("Registered hook handler for '{}' with priority {}", name, priority);
    }

    /// Run all handlers for `name` over `data` and return the result
    pub fn trigger(&self, name: &str, mut data: Value) -> Value {
        let hooks = self.hooks.read().unwrap_or_else(|e| e.into_inner());

        if let Some(handlers) = hooks.get(name) {
            for handler in handlers {
                if let Some(result) = (handler.callback)(&mut data) {
                    data = result;
                }
            }
        }

        data
    }

    pub fn has_handlers(&self, name: &str) -> bool {
        let hooks = self.hooks.read().unwrap_or_else(|e| e.into_inner());
        hooks.get(name).is_some_and(|h| !h.is_empty())
    }
}

/// Hooks with trigger points in this crate
pub mod hook_names {
    /// Content types hidden from the locator. Receives and returns a JSON array
    /// of keys. Triggered in src/services/content_types.rs
    pub const EXCLUDED_POST_TYPES: &str = "shortcode_locator_excluded_post_types";

    /// Columns of a per-type content listing. Receives
    /// `{"content_type": .., "columns": [{"key": .., "label": ..}]}`.
    /// Triggered in src/services/columns.rs
    pub const MANAGE_COLUMNS: &str = "shortcode_locator_manage_columns";
}
