//! Feed classification and filtering.
//!
//! Pure functions over the published lists; the view is rebuilt on every
//! call and nothing is cached.

use crate::models::{ContentFilter, FeedItem, NotificationItem, Reminder, StatusFilter};

/// Build the filtered feed for a content selection and optional status.
///
/// The status filter only narrows `All`, `Seen` and `Unseen`; it is ignored
/// for `Notifications` and `Reminders`. Items are sorted newest first with a
/// stable sort, so equal dates keep their input order (reminders, then
/// notifications).
pub fn filter_feed(
    reminders: &[Reminder],
    notifications: &[NotificationItem],
    content: ContentFilter,
    status: Option<StatusFilter>,
) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = match content {
        ContentFilter::Notifications => notifications
            .iter()
            .filter(|n| n.is_notification_type())
            .cloned()
            .map(FeedItem::Notification)
            .collect(),
        ContentFilter::Reminders => reminders
            .iter()
            .cloned()
            .map(FeedItem::Reminder)
            .chain(
                notifications
                    .iter()
                    .filter(|n| n.is_reminder_type())
                    .cloned()
                    .map(FeedItem::Notification),
            )
            .collect(),
        ContentFilter::All | ContentFilter::Seen | ContentFilter::Unseen => reminders
            .iter()
            .cloned()
            .map(FeedItem::Reminder)
            .chain(notifications.iter().cloned().map(FeedItem::Notification))
            .collect(),
    };

    let implied = match content {
        ContentFilter::Seen => Some(StatusFilter::Seen),
        ContentFilter::Unseen => Some(StatusFilter::Unseen),
        _ => None,
    };
    let status = status.filter(|_| content.accepts_status_filter());

    for filter in [implied, status].into_iter().flatten() {
        items.retain(|item| filter.matches(item));
    }

    sort_newest_first(&mut items);
    items
}

/// Stable sort, newest first.
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Split items into (seen, unseen), preserving order.
pub fn partition_by_status(items: Vec<FeedItem>) -> (Vec<FeedItem>, Vec<FeedItem>) {
    items
        .into_iter()
        .partition(|item| StatusFilter::Seen.matches(item))
}

/// Number of unread notifications, used for the badge.
pub fn unread_count(notifications: &[NotificationItem]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}
