//! # Site Settings
//!
//! Reads fall back to built-in defaults when the settings row has never
//! been written; writes are administrator-only and clamp gravity so a
//! negative exponent can never reach the score function.

use std::sync::Arc;

use domains::{AppError, Result, SettingsStore, SiteSettings};

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    admin_user_id: i64,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>, admin_user_id: i64) -> Self {
        Self {
            store,
            admin_user_id,
        }
    }

    pub async fn current(&self) -> Result<SiteSettings> {
        let mut settings = self
            .store
            .load()
            .await?
            .unwrap_or_else(SiteSettings::defaults);
        // Clamp on the way out too, in case the row was edited by hand.
        settings.gravity = settings.gravity.max(0.0);
        Ok(settings)
    }

    pub async fn update(&self, caller_id: i64, mut settings: SiteSettings) -> Result<SiteSettings> {
        if caller_id != self.admin_user_id {
            return Err(AppError::Unauthorized(
                "only an administrator may edit site settings".to_string(),
            ));
        }
        if settings.title.trim().is_empty() {
            return Err(AppError::Validation(
                "site title must not be empty".to_string(),
            ));
        }
        settings.gravity = settings.gravity.max(0.0);
        self.store.save(&settings).await?;
        tracing::info!(gravity = settings.gravity, "site settings updated");
        Ok(settings)
    }
}
