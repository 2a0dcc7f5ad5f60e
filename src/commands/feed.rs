//! Feed loading and filtered views.

use crate::error::AppError;
use crate::models::{ContentFilter, FeedItem, StatusFilter};
use crate::services::feed_filter;
use crate::services::LoadOutcome;
use crate::state::AppState;
use serde::Serialize;

/// Seen/unseen totals over the whole feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub seen: usize,
    pub unseen: usize,
}

/// Run a reconciliation pass (initial load and pull-to-refresh).
///
/// Prunes the local notification log first when configured to. A failed
/// fetch is returned to the caller; the previously loaded feed stays in place.
pub async fn load_feed(state: &AppState) -> Result<LoadOutcome, AppError> {
    let feed_config = state.settings().await.feed;

    if feed_config.prune_on_load {
        if let Some(notification_log) = state.notification_log() {
            if let Err(e) = notification_log
                .prune_older_than(feed_config.notification_retention_days)
                .await
            {
                log::warn!("[feed] Failed to prune notification log: {}", e);
            }
        }
    }

    state.reconciler().load().await
}

/// Filtered, newest-first view of the loaded feed.
pub async fn get_feed(
    state: &AppState,
    content: ContentFilter,
    status: Option<StatusFilter>,
) -> Vec<FeedItem> {
    let snapshot = state.feed().snapshot().await;
    feed_filter::filter_feed(&snapshot.reminders, &snapshot.notifications, content, status)
}

/// Number of unread notifications, for the badge.
pub async fn get_unread_count(state: &AppState) -> usize {
    let snapshot = state.feed().snapshot().await;
    feed_filter::unread_count(&snapshot.notifications)
}

/// Seen/unseen totals for the given content selection.
pub async fn get_status_counts(state: &AppState, content: ContentFilter) -> StatusCounts {
    let items = get_feed(state, content, None).await;
    let (seen, unseen) = feed_filter::partition_by_status(items);
    StatusCounts {
        seen: seen.len(),
        unseen: unseen.len(),
    }
}
