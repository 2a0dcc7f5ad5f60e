//! Collaborator interfaces consumed by the feed core.
//!
//! Implementations: [`crate::services::BackendClient`] for reminders and
//! remote flags, [`crate::services::SqliteNotificationLog`] for generated
//! notifications.

use crate::error::AppError;
use crate::models::{RawNotification, Reminder, RemoteFlagMap};
use async_trait::async_trait;

/// Backend-backed reminder collection for the signed-in user.
#[async_trait]
pub trait ReminderSource: Send + Sync {
    async fn fetch_reminders(&self) -> Result<Vec<Reminder>, AppError>;
    async fn delete_reminder(&self, id: &str) -> Result<(), AppError>;
    async fn mark_reminder_completed(&self, id: &str) -> Result<(), AppError>;
}

/// Notifications produced by the notification generator.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn fetch_stored_notifications(&self) -> Result<Vec<RawNotification>, AppError>;
}

/// Per-user read/deleted flags held by the backend.
#[async_trait]
pub trait RemoteFlagBackend: Send + Sync {
    /// Id of the user the backend session belongs to.
    async fn current_user_id(&self) -> Result<String, AppError>;
    async fn fetch_flags(&self, user_id: &str) -> Result<RemoteFlagMap, AppError>;
    async fn upsert_read_flag(&self, user_id: &str, id: &str, read: bool) -> Result<(), AppError>;
    async fn upsert_deleted_flag(&self, user_id: &str, id: &str) -> Result<(), AppError>;
}
