//! Settings commands for application configuration.
//!
//! Settings are persisted as JSON in `settings.json` inside the app data
//! directory. Missing files, sections or fields fall back to defaults.

use crate::error::AppError;
use crate::services::BackendClientConfig;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings filename inside the app data directory.
const SETTINGS_FILE: &str = "settings.json";

/// Key for the backend section.
const BACKEND_KEY: &str = "backend";

/// Key for the feed section.
const FEED_KEY: &str = "feed";

/// Default request timeout for backend calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default age after which logged notifications are pruned.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Longest accepted retention (ten years).
pub const MAX_RETENTION_DAYS: u32 = 3650;

/// Connection settings for the backend project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the backend project.
    pub base_url: String,

    /// Public API key.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BackendSettings {
    /// Client configuration for a signed-in session.
    pub fn client_config(&self, access_token: &str) -> BackendClientConfig {
        BackendClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            access_token: access_token.to_string(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Feed behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Logged notifications older than this are pruned.
    pub notification_retention_days: u32,

    /// Whether `load_feed` prunes the notification log first.
    pub prune_on_load: bool,
}

impl FeedConfig {
    /// Check that the retention lies in `1..=MAX_RETENTION_DAYS`.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_RETENTION_DAYS).contains(&self.notification_retention_days) {
            return Err(AppError::invalid_input_field(
                format!(
                    "Retention must be between 1 and {} days",
                    MAX_RETENTION_DAYS
                ),
                "notification_retention_days",
            ));
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            notification_retention_days: DEFAULT_RETENTION_DAYS,
            prune_on_load: true,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub backend: BackendSettings,
    pub feed: FeedConfig,
}

/// Path of the settings file inside `app_data_dir`.
pub fn settings_path(app_data_dir: &Path) -> PathBuf {
    app_data_dir.join(SETTINGS_FILE)
}

/// Load settings from disk, using defaults for anything missing or unreadable.
pub fn load_settings(app_data_dir: &Path) -> Result<AppSettings, AppError> {
    let path = settings_path(app_data_dir);

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppSettings::default()),
        Err(e) => return Err(e.into()),
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("[settings] Ignoring unreadable {}: {}", path.display(), e);
            return Ok(AppSettings::default());
        }
    };

    let backend = match value.get(BACKEND_KEY) {
        Some(section) => serde_json::from_value(section.clone()).unwrap_or_default(),
        None => BackendSettings::default(),
    };

    let mut feed = match value.get(FEED_KEY) {
        Some(section) => serde_json::from_value(section.clone()).unwrap_or_default(),
        None => FeedConfig::default(),
    };
    if let Err(e) = feed.validate() {
        log::warn!("[settings] Ignoring feed section of {}: {}", path.display(), e);
        feed = FeedConfig::default();
    }

    Ok(AppSettings { backend, feed })
}

/// Save settings to disk.
pub fn save_settings(app_data_dir: &Path, settings: &AppSettings) -> Result<(), AppError> {
    std::fs::create_dir_all(app_data_dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(app_data_dir), json)?;
    Ok(())
}

/// Get the current application settings.
pub async fn get_settings(state: &AppState) -> AppSettings {
    state.settings().await
}

/// Update application settings and persist them.
///
/// Backend changes take effect on the next [`AppState::open`].
pub async fn update_settings(state: &AppState, settings: AppSettings) -> Result<(), AppError> {
    settings.feed.validate()?;

    save_settings(state.app_data_dir(), &settings)?;
    state.replace_settings(settings).await;
    Ok(())
}
