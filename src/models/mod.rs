//! Data models for the notification and reminder feed.
//!
//! Raw records come from the local notification log and the backend; the
//! feed types are what the presentation layer renders.

pub mod feed;
pub mod flags;
pub mod notification;
pub mod reminder;

// Re-exports for convenient access
pub use feed::{ContentFilter, FeedItem, StatusFilter};
pub use flags::{RemoteFlagMap, RemoteFlagState};
pub use notification::{NotificationItem, NotificationType, RawNotification};
pub use reminder::{Recurrence, Reminder};
