//! Shortcode column on the host's per-type content listings

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::db::repositories::ContentRepository;
use crate::plugin::{hook_names, HookManager, ShortcodeMatcher};
use crate::services::sanitize::html_escape;
use crate::services::settings::DisplaySettingsGate;

/// Key of the column added to enabled listings
pub const SHORTCODES_COLUMN: &str = "shortcodes";
pub const SHORTCODES_COLUMN_LABEL: &str = "Shortcodes Located";

/// A listing column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Columns the host shows on every content listing
pub fn default_columns() -> Vec<Column> {
    vec![Column::new("title", "Title"), Column::new("date", "Date")]
}

#[derive(Debug, Error)]
pub enum ColumnServiceError {
    #[error("Failed to load content item: {0}")]
    LoadError(String),
}

pub struct ColumnService {
    settings: Arc<DisplaySettingsGate>,
    content: Arc<dyn ContentRepository>,
    matcher: ShortcodeMatcher,
    hooks: Arc<HookManager>,
}

impl ColumnService {
    pub fn new(
        settings: Arc<DisplaySettingsGate>,
        content: Arc<dyn ContentRepository>,
        matcher: ShortcodeMatcher,
        hooks: Arc<HookManager>,
    ) -> Self {
        Self {
            settings,
            content,
            matcher,
            hooks,
        }
    }

    /// `base` plus the shortcode column when `content_type` has it enabled,
    /// then passed through the manage-columns hook.
    pub async fn columns_for(&self, content_type: &str, base: Vec<Column>) -> Vec<Column> {
        let mut columns = base;
        if self.settings.is_column_enabled(content_type).await {
            columns.push(Column::new(SHORTCODES_COLUMN, SHORTCODES_COLUMN_LABEL));
        }

        if !self.hooks.has_handlers(hook_names::MANAGE_COLUMNS) {
            return columns;
        }

        let output = self.hooks.trigger(
            hook_names::MANAGE_COLUMNS,
            json!({ "content_type": content_type, "columns": columns }),
        );
        match serde_json::from_value::<Vec<Column>>(output["columns"].clone()) {
            Ok(filtered) => filtered,
            Err(e) => {
                warn!(
                    "Hook '{}' returned malformed columns, ignoring: {}",
                    hook_names::MANAGE_COLUMNS,
                    e
                );
                columns
            }
        }
    }

    /// Every shortcode occurrence in the item's body, `None` if the item
    /// does not exist.
    pub async fn render_cell(&self, item_id: i64) -> Result<Option<Vec<String>>, ColumnServiceError> {
        let item = self
            .content
            .get_by_id(item_id)
            .await
            .map_err(|e| ColumnServiceError::LoadError(format!("{:#}", e)))?;

        Ok(item.map(|item| {
            self.matcher
                .find_shortcodes(&item.body, None)
                .into_iter()
                .map(|o| o.text)
                .collect()
        }))
    }

    /// Occurrences escaped for HTML and joined with `<br />`
    pub async fn render_cell_html(&self, item_id: i64) -> Result<Option<String>, ColumnServiceError> {
        Ok(self.render_cell(item_id).await?.as_deref().map(cell_html))
    }
}

/// Occurrences escaped for HTML and joined with `<br />`
pub fn cell_html(shortcodes: &[String]) -> String {
    shortcodes
        .iter()
        .map(|s| html_escape(s))
        .collect::<Vec<_>>()
        .join("<br />")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxContentRepository, SqlxSettingsRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateContentItemInput;
    use crate::plugin::hooks::PRIORITY_DEFAULT;
    use crate::plugin::ShortcodeRegistry;

    struct Fixture {
        content: Arc<dyn ContentRepository>,
        settings: Arc<DisplaySettingsGate>,
        hooks: Arc<HookManager>,
        service: ColumnService,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let content = SqlxContentRepository::boxed(pool.clone());
        let settings = Arc::new(DisplaySettingsGate::new(SqlxSettingsRepository::boxed(pool)));
        let hooks = Arc::new(HookManager::new());
        let matcher = ShortcodeMatcher::new(Arc::new(ShortcodeRegistry::with_core_tags()));
        let service = ColumnService::new(settings.clone(), content.clone(), matcher, hooks.clone());

        Fixture {
            content,
            settings,
            hooks,
            service,
        }
    }

    #[tokio::test]
    async fn test_column_added_only_when_enabled() {
        let f = setup().await;
        assert_eq!(f.service.columns_for("post", default_columns()).await, default_columns());

        assert!(f.settings.save(["post"]).await);
        let columns = f.service.columns_for("post", default_columns()).await;
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2], Column::new("shortcodes", "Shortcodes Located"));

        assert_eq!(f.service.columns_for("page", default_columns()).await, default_columns());
    }

    #[tokio::test]
    async fn test_manage_columns_hook() {
        let f = setup().await;
        f.hooks.register(
            hook_names::MANAGE_COLUMNS,
            |data| {
                if let Some(columns) = data["columns"].as_array_mut() {
                    columns.retain(|c| c["key"] != "date");
                }
                None
            },
            PRIORITY_DEFAULT,
        );

        let columns = f.service.columns_for("post", default_columns()).await;
        assert_eq!(columns, vec![Column::new("title", "Title")]);
    }

    #[tokio::test]
    async fn test_render_cell() {
        let f = setup().await;
        let item = f
            .content
            .create(&CreateContentItemInput::new(
                "Hello",
                "post",
                r#"[gallery ids="1,2"] text [caption]<b>x</b>[/caption]"#,
            ))
            .await
            .unwrap();

        let cell = f.service.render_cell(item.id).await.unwrap().unwrap();
        assert_eq!(cell, vec![r#"[gallery ids="1,2"]"#, "[caption]<b>x</b>[/caption]"]);

        let html = f.service.render_cell_html(item.id).await.unwrap().unwrap();
        assert_eq!(
            html,
            "[gallery ids=&quot;1,2&quot;]<br />[caption]&lt;b&gt;x&lt;/b&gt;[/caption]"
        );
    }

    #[tokio::test]
    async fn test_render_cell_empty_and_missing() {
        let f = setup().await;
        let item = f
            .content
            .create(&CreateContentItemInput::new("Plain", "post", "nothing here"))
            .await
            .unwrap();

        assert_eq!(f.service.render_cell_html(item.id).await.unwrap(), Some(String::new()));
        assert!(f.service.render_cell(item.id + 1).await.unwrap().is_none());
    }
}
