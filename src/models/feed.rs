//! Unified feed item and the two filter axes.

use super::{NotificationItem, Reminder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Either kind of entity shown in the notifications screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
pub enum FeedItem {
    Reminder(Reminder),
    Notification(NotificationItem),
}

impl FeedItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Reminder(r) => &r.id,
            Self::Notification(n) => &n.id,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Self::Reminder(r) => r.date,
            Self::Notification(n) => n.date,
        }
    }

    /// Completed reminders and read notifications are "seen".
    pub fn is_seen(&self) -> bool {
        match self {
            Self::Reminder(r) => r.is_completed,
            Self::Notification(n) => n.is_read,
        }
    }
}

/// Primary filter axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    Notifications,
    Reminders,
    #[default]
    All,
    Seen,
    Unseen,
}

impl ContentFilter {
    /// Whether the secondary status filter narrows this selection.
    pub fn accepts_status_filter(&self) -> bool {
        matches!(self, Self::All | Self::Seen | Self::Unseen)
    }
}

/// Secondary filter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Seen,
    Unseen,
}

impl StatusFilter {
    pub fn matches(&self, item: &FeedItem) -> bool {
        match self {
            Self::Seen => item.is_seen(),
            Self::Unseen => !item.is_seen(),
        }
    }
}
