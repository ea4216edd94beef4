//! Display preference slot (`theme-mode`).

use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, THEME_MODE_KEY};

#[derive(Debug, Clone)]
pub struct ThemePreference {
    storage: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Absent or unparsable values read as light mode.
    pub async fn is_dark_mode(&self) -> Result<bool, StorageError> {
        let raw = self.storage.get(THEME_MODE_KEY).await?;
        Ok(raw
            .and_then(|v| serde_json::from_str::<bool>(&v).ok())
            .unwrap_or(false))
    }

    pub async fn set_dark_mode(&self, dark: bool) -> Result<(), StorageError> {
        self.storage
            .set(THEME_MODE_KEY, &serde_json::to_string(&dark)?)
            .await
    }

    /// Flip the preference and return the new value.
    pub async fn toggle(&self) -> Result<bool, StorageError> {
        let next = !self.is_dark_mode().await?;
        self.set_dark_mode(next).await?;
        tracing::debug!(name: "preferences.theme.toggled", dark_mode = next, "theme toggled");
        Ok(next)
    }
}
