//! Display settings gate
//!
//! Which content types show the "Shortcodes Located" column. The whole set
//! is stored as one JSON option and replaced on every save.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::db::repositories::SettingsRepository;
use crate::models::DisplaySettings;
use crate::services::sanitize::sanitize_text_field;

/// Option key holding the display settings
pub const OPTION_NAME: &str = "shortcode_locator";

/// Settings service errors
#[derive(Debug, Error)]
pub enum SettingsServiceError {
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    #[error("Failed to save settings: {0}")]
    SaveError(String),
}

pub struct DisplaySettingsGate {
    repo: Arc<dyn SettingsRepository>,
}

impl DisplaySettingsGate {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Current settings. A missing or undecodable record reads as empty.
    pub async fn settings(&self) -> Result<DisplaySettings, SettingsServiceError> {
        let setting = self
            .repo
            .get(OPTION_NAME)
            .await
            .map_err(|e| SettingsServiceError::LoadError(e.to_string()))?;

        let Some(setting) = setting else {
            return Ok(DisplaySettings::default());
        };

        match serde_json::from_str(&setting.value) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Stored display settings are not valid JSON, using defaults: {}", e);
                Ok(DisplaySettings::default())
            }
        }
    }

    /// Whether `content_type` has the column enabled. Load failures read as
    /// disabled.
    pub async fn is_column_enabled(&self, content_type: &str) -> bool {
        match self.settings().await {
            Ok(settings) => settings.is_enabled(content_type),
            Err(e) => {
                warn!("Treating shortcode column as disabled for '{}': {}", content_type, e);
                false
            }
        }
    }

    /// Replace the enabled set. Keys are sanitised and blanks dropped.
    /// Returns whether the settings were persisted.
    pub async fn save<I, S>(&self, content_types: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let settings = DisplaySettings::new(
            content_types
                .into_iter()
                .map(|key| sanitize_text_field(key.as_ref()))
                .filter(|key| !key.is_empty()),
        );

        match self.persist(&settings).await {
            Ok(()) => {
                info!(
                    "Saved display settings for {} content type(s)",
                    settings.display_column.len()
                );
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    async fn persist(&self, settings: &DisplaySettings) -> Result<(), SettingsServiceError> {
        let value = serde_json::to_string(settings)
            .map_err(|e| SettingsServiceError::SaveError(e.to_string()))?;
        self.repo
            .set(OPTION_NAME, &value)
            .await
            .map_err(|e| SettingsServiceError::SaveError(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSettingsRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_gate() -> (DynDatabasePool, Arc<dyn SettingsRepository>, DisplaySettingsGate) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSettingsRepository::boxed(pool.clone());
        let gate = DisplaySettingsGate::new(repo.clone());
        (pool, repo, gate)
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let (_pool, _repo, gate) = setup_gate().await;
        assert_eq!(gate.settings().await.unwrap(), DisplaySettings::default());
        assert!(!gate.is_column_enabled("post").await);
    }

    #[tokio::test]
    async fn test_save_then_read() {
        let (_pool, repo, gate) = setup_gate().await;
        assert!(gate.save(["post"]).await);

        assert_eq!(gate.settings().await.unwrap(), DisplaySettings::new(["post"]));
        assert!(gate.is_column_enabled("post").await);
        assert!(!gate.is_column_enabled("page").await);

        let stored = repo.get(OPTION_NAME).await.unwrap().unwrap();
        assert_eq!(stored.value, r#"{"display_column":["post"]}"#);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_sanitises() {
        let (_pool, _repo, gate) = setup_gate().await;
        assert!(gate.save(["post", "page"]).await);
        assert!(gate.save([" page ", "", "<b>x</b>"]).await);

        let settings = gate.settings().await.unwrap();
        assert_eq!(settings, DisplaySettings::new(["page", "x"]));
    }

    #[tokio::test]
    async fn test_save_empty_set() {
        let (_pool, _repo, gate) = setup_gate().await;
        assert!(gate.save(["post"]).await);
        assert!(gate.save(Vec::<String>::new()).await);
        assert!(!gate.is_column_enabled("post").await);
    }

    #[tokio::test]
    async fn test_corrupt_record_reads_as_default() {
        let (_pool, repo, gate) = setup_gate().await;
        repo.set(OPTION_NAME, "{not json").await.unwrap();
        assert_eq!(gate.settings().await.unwrap(), DisplaySettings::default());
    }

    #[tokio::test]
    async fn test_storage_failures() {
        let (pool, _repo, gate) = setup_gate().await;
        pool.execute("DROP TABLE settings").await.unwrap();

        assert!(!gate.save(["post"]).await);
        assert!(matches!(gate.settings().await, Err(SettingsServiceError::LoadError(_))));
        assert!(!gate.is_column_enabled("post").await);
    }
}
