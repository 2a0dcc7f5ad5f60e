//! Business logic services.
//!
//! This module contains the feed core: flag storage, the remote flag
//! mirror, the reconciliation pipeline and the feed filters, plus the
//! backend client and local notification log they run against.
//!
//! Services take their collaborators as constructor arguments and are
//! independent of any UI framework.

pub mod backend_client;
pub mod feed_filter;
pub mod feed_state;
pub mod key_value_store;
pub mod notification_log;
pub mod notification_store;
pub mod reconciler;
pub mod remote_mirror;
pub mod sources;

pub use backend_client::{BackendClient, BackendClientConfig};
pub use feed_state::{FeedSnapshot, FeedState};
pub use key_value_store::{InMemoryPreferences, KeyValueStore, SqlitePreferences};
pub use notification_log::{NewNotification, SqliteNotificationLog};
pub use notification_store::LocalNotificationStore;
pub use reconciler::{FeedReconciler, LoadOutcome};
pub use remote_mirror::RemoteMirror;
pub use sources::{NotificationSource, ReminderSource, RemoteFlagBackend};
