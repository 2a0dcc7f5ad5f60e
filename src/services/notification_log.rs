//! Local log of generated notifications.
//!
//! The notification generator (budget checks, goal tracking, scheduled
//! tips) records what it emitted here; the feed loader reads it back.

use crate::db::pool::DbPool;
use crate::db::stored_notifications;
use crate::error::AppError;
use crate::models::{NotificationType, RawNotification};
use crate::services::sources::NotificationSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Notification about to be recorded.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
}

/// SQLite-backed notification log.
#[derive(Debug, Clone)]
pub struct SqliteNotificationLog {
    pool: DbPool,
}

impl SqliteNotificationLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append a notification and return the stored record.
    pub async fn record_notification(
        &self,
        input: NewNotification,
    ) -> Result<RawNotification, AppError> {
        if input.title.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Notification title is required",
                "title",
            ));
        }

        let record = RawNotification {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            body: input.body,
            date: input.date.unwrap_or_else(Utc::now).to_rfc3339(),
            type_tag: input.notification_type.as_tag().to_string(),
        };

        stored_notifications::insert_notification(&self.pool, &record).await?;
        log::debug!("[notifications] Recorded {} ({})", record.id, record.type_tag);

        Ok(record)
    }

    pub async fn list_notifications(&self) -> Result<Vec<RawNotification>, AppError> {
        Ok(stored_notifications::list_notifications(&self.pool).await?)
    }

    /// Drop records older than `retention_days`. Returns the number removed.
    pub async fn prune_older_than(&self, retention_days: u32) -> Result<u64, AppError> {
        let cutoff = Utc::now()
            .checked_sub_signed(Duration::days(i64::from(retention_days)))
            .ok_or_else(|| {
                AppError::invalid_input_field(
                    format!("Retention of {} days is out of range", retention_days),
                    "notification_retention_days",
                )
            })?;
        let removed =
            stored_notifications::delete_created_before(&self.pool, cutoff.timestamp()).await?;

        if removed > 0 {
            log::info!(
                "[notifications] Pruned {} notifications older than {} days",
                removed,
                retention_days
            );
        }
        Ok(removed)
    }
}

#[async_trait]
impl NotificationSource for SqliteNotificationLog {
    async fn fetch_stored_notifications(&self) -> Result<Vec<RawNotification>, AppError> {
        self.list_notifications().await
    }
}
