//! Feed reconciliation (the load pipeline).
//!
//! One pass:
//! 1. Fetch reminders and stored notifications concurrently
//! 2. Initialize the remote mirror
//! 3. Merge remote flags into the local store (remote wins)
//! 4. Drop notifications whose id is in the deleted set
//! 5. Overwrite each notification's read flag from the local store
//! 6. Publish the lists
//!
//! Steps 2-3 degrade to the cached local flags when the backend is
//! unreachable. A failed step 1 fails the pass and leaves the previously
//! published feed untouched.

use crate::error::AppError;
use crate::models::{NotificationItem, RawNotification};
use crate::services::feed_state::FeedState;
use crate::services::notification_store::LocalNotificationStore;
use crate::services::remote_mirror::RemoteMirror;
use crate::services::sources::{NotificationSource, ReminderSource};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub generation: u64,
    /// False when a newer pass started or the feed was shut down meanwhile.
    pub published: bool,
    /// Whether remote flags were merged this pass.
    pub remote_merged: bool,
    pub reminder_count: usize,
    pub notification_count: usize,
    /// Raw records dropped because their date could not be parsed.
    pub skipped_records: usize,
    pub duration_ms: u64,
}

/// Parse raw records, dropping those with unreadable dates.
pub fn parse_notifications(raw: Vec<RawNotification>) -> (Vec<NotificationItem>, usize) {
    let total = raw.len();
    let items: Vec<NotificationItem> = raw.into_iter().filter_map(NotificationItem::from_raw).collect();
    let skipped = total - items.len();
    (items, skipped)
}

/// Remove every notification whose id is in `deleted`.
pub fn apply_deletions(
    items: Vec<NotificationItem>,
    deleted: &HashSet<String>,
) -> Vec<NotificationItem> {
    items
        .into_iter()
        .filter(|item| !deleted.contains(&item.id))
        .collect()
}

/// Replace each item's read flag with the stored one; ids missing from
/// `flags` read as unread.
pub fn apply_read_flags(
    items: Vec<NotificationItem>,
    flags: &HashMap<String, bool>,
) -> Vec<NotificationItem> {
    items
        .into_iter()
        .map(|mut item| {
            item.is_read = flags.get(&item.id).copied().unwrap_or(false);
            item
        })
        .collect()
}

/// Runs reconciliation passes against injected collaborators.
#[derive(Clone)]
pub struct FeedReconciler {
    reminders: Arc<dyn ReminderSource>,
    notifications: Arc<dyn NotificationSource>,
    store: LocalNotificationStore,
    mirror: RemoteMirror,
    feed: Arc<FeedState>,
}

impl FeedReconciler {
    pub fn new(
        reminders: Arc<dyn ReminderSource>,
        notifications: Arc<dyn NotificationSource>,
        store: LocalNotificationStore,
        mirror: RemoteMirror,
        feed: Arc<FeedState>,
    ) -> Self {
        Self {
            reminders,
            notifications,
            store,
            mirror,
            feed,
        }
    }

    /// Run one pass and publish its result if it is still the newest pass.
    pub async fn load(&self) -> Result<LoadOutcome, AppError> {
        let start = Instant::now();
        let ticket = self.feed.begin_pass();
        let mut outcome = LoadOutcome {
            generation: ticket.generation(),
            ..Default::default()
        };

        let cancelled = self.feed.cancellation();
        let fetched = tokio::select! {
            _ = cancelled.cancelled() => None,
            fetched = async {
                futures::join!(
                    self.reminders.fetch_reminders(),
                    self.notifications.fetch_stored_notifications()
                )
            } => Some(fetched),
        };
        let Some((reminders, raw_notifications)) = fetched else {
            log::debug!("[feed] Pass {} cancelled during fetch", ticket.generation());
            outcome.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(outcome);
        };
        let reminders = reminders?;
        let (notifications, skipped) = parse_notifications(raw_notifications?);
        outcome.skipped_records = skipped;

        if !self.feed.is_current(ticket) {
            log::debug!("[feed] Pass {} superseded after fetch", ticket.generation());
            outcome.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(outcome);
        }

        outcome.remote_merged = self.merge_remote_flags().await;

        let deleted = self.store.get_deleted_ids().await;
        let notifications = apply_deletions(notifications, &deleted);

        let flags = self
            .store
            .get_read_flags(notifications.iter().map(|n| n.id.as_str()))
            .await;
        let notifications = apply_read_flags(notifications, &flags);

        outcome.reminder_count = reminders.len();
        outcome.notification_count = notifications.len();
        outcome.published = self.feed.publish(ticket, reminders, notifications).await;
        outcome.duration_ms = start.elapsed().as_millis() as u64;

        log::info!(
            "[feed] Pass {}: {} reminders, {} notifications, {} skipped, remote_merged={}, published={} ({}ms)",
            outcome.generation,
            outcome.reminder_count,
            outcome.notification_count,
            outcome.skipped_records,
            outcome.remote_merged,
            outcome.published,
            outcome.duration_ms
        );

        Ok(outcome)
    }

    /// Steps 2-3. Failures are logged and the pass falls back to cached flags.
    async fn merge_remote_flags(&self) -> bool {
        if let Err(e) = self.mirror.initialize().await {
            log::warn!("[feed] Remote mirror unavailable, using cached flags: {}", e);
            return false;
        }

        match self.mirror.apply_remote_states_to_local().await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[feed] Failed to merge remote flags, using cached flags: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use chrono::Utc;

    fn item(id: &str, read: bool) -> NotificationItem {
        NotificationItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            date: Utc::now(),
            is_read: read,
            notification_type: NotificationType::BudgetAlert,
        }
    }

    #[test]
    fn test_parse_notifications_counts_skipped() {
        let raw = vec![
            RawNotification {
                id: "ok".to_string(),
                title: "t".to_string(),
                body: String::new(),
                date: "2024-01-01T00:00:00Z".to_string(),
                type_tag: "milestone".to_string(),
            },
            RawNotification {
                id: "bad".to_string(),
                title: "t".to_string(),
                body: String::new(),
                date: "not a date".to_string(),
                type_tag: "milestone".to_string(),
            },
        ];

        let (items, skipped) = parse_notifications(raw);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ok");
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_apply_deletions_is_stable_under_duplicate_ids() {
        let deleted: HashSet<String> = ["n1".to_string()].into_iter().collect();
        let items = vec![item("n1", false), item("n2", false), item("n1", true)];

        let kept = apply_deletions(items, &deleted);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "n2");
    }

    #[test]
    fn test_apply_read_flags_overwrites_and_defaults_to_unread() {
        let flags: HashMap<String, bool> = [("a".to_string(), false), ("c".to_string(), true)]
            .into_iter()
            .collect();
        let items = vec![item("a", true), item("b", true), item("c", false)];

        let merged = apply_read_flags(items, &flags);
        let read: Vec<(&str, bool)> = merged.iter().map(|n| (n.id.as_str(), n.is_read)).collect();
        assert_eq!(read, vec![("a", false), ("b", false), ("c", true)]);
    }
}
