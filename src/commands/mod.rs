//! Command handlers exposed to the presentation layer.
//!
//! Commands are organized by functionality:
//! - `feed`: Loading, filtering and counting the feed
//! - `notifications`: Read/delete actions and logging generated notifications
//! - `reminders`: Reminder delete/complete actions
//! - `settings`: Application settings management

pub mod feed;
pub mod notifications;
pub mod reminders;
pub mod settings;

pub use feed::{get_feed, get_status_counts, get_unread_count, load_feed, StatusCounts};
pub use notifications::{
    delete_notification, mark_all_notifications_read, mark_notification_read, record_notification,
};
pub use reminders::{complete_reminder, delete_reminder};
pub use settings::{get_settings, update_settings, AppSettings, BackendSettings, FeedConfig};
