//! Application state shared by the commands.
//!
//! Built once per signed-in session, either from the on-disk defaults
//! ([`AppState::open`]) or from explicitly supplied collaborators
//! ([`AppState::from_collaborators`]).

use crate::commands::settings::{self, AppSettings};
use crate::db;
use crate::error::AppError;
use crate::services::{
    BackendClient, FeedReconciler, FeedState, KeyValueStore, LocalNotificationStore,
    NotificationSource, ReminderSource, RemoteFlagBackend, RemoteMirror, SqliteNotificationLog,
    SqlitePreferences,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// External collaborators the feed core runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub preferences: Arc<dyn KeyValueStore>,
    pub flag_backend: Arc<dyn RemoteFlagBackend>,
    pub reminders: Arc<dyn ReminderSource>,
    pub notifications: Arc<dyn NotificationSource>,
}

/// Session state.
pub struct AppState {
    app_data_dir: PathBuf,
    settings: RwLock<AppSettings>,
    store: LocalNotificationStore,
    mirror: RemoteMirror,
    reminders: Arc<dyn ReminderSource>,
    reconciler: FeedReconciler,
    feed: Arc<FeedState>,
    notification_log: Option<SqliteNotificationLog>,
}

impl AppState {
    /// Wire the feed core to the given collaborators.
    pub fn from_collaborators(
        app_data_dir: impl Into<PathBuf>,
        settings: AppSettings,
        collaborators: Collaborators,
    ) -> Self {
        let store = LocalNotificationStore::new(collaborators.preferences);
        let mirror = RemoteMirror::new(collaborators.flag_backend, store.clone());
        let feed = Arc::new(FeedState::new());
        let reconciler = FeedReconciler::new(
            collaborators.reminders.clone(),
            collaborators.notifications,
            store.clone(),
            mirror.clone(),
            feed.clone(),
        );

        Self {
            app_data_dir: app_data_dir.into(),
            settings: RwLock::new(settings),
            store,
            mirror,
            reminders: collaborators.reminders,
            reconciler,
            feed,
            notification_log: None,
        }
    }

    /// Open the local database and settings under `app_data_dir` and connect
    /// to the backend with the session's access token.
    pub async fn open(app_data_dir: &Path, access_token: &str) -> Result<Self, AppError> {
        let settings = settings::load_settings(app_data_dir)?;
        let pool = db::initialize(&db::get_db_path(app_data_dir)).await?;

        let backend = Arc::new(BackendClient::new(
            settings.backend.client_config(access_token),
        )?);
        let notification_log = SqliteNotificationLog::new(pool.clone());

        let collaborators = Collaborators {
            preferences: Arc::new(SqlitePreferences::new(pool)),
            flag_backend: backend.clone(),
            reminders: backend,
            notifications: Arc::new(notification_log.clone()),
        };

        log::info!("[state] Opened app data at {}", app_data_dir.display());

        Ok(Self::from_collaborators(app_data_dir, settings, collaborators)
            .with_notification_log(notification_log))
    }

    pub fn app_data_dir(&self) -> &Path {
        &self.app_data_dir
    }

    pub async fn settings(&self) -> AppSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn replace_settings(&self, settings: AppSettings) {
        *self.settings.write().await = settings;
    }

    pub fn store(&self) -> &LocalNotificationStore {
        &self.store
    }

    pub fn mirror(&self) -> &RemoteMirror {
        &self.mirror
    }

    pub fn reminders(&self) -> &Arc<dyn ReminderSource> {
        &self.reminders
    }

    pub fn reconciler(&self) -> &FeedReconciler {
        &self.reconciler
    }

    pub fn feed(&self) -> &Arc<FeedState> {
        &self.feed
    }

    /// The local notification log, when the state was opened from disk.
    pub fn notification_log(&self) -> Option<&SqliteNotificationLog> {
        self.notification_log.as_ref()
    }

    /// Attach a notification log to a state built from collaborators.
    pub fn with_notification_log(mut self, notification_log: SqliteNotificationLog) -> Self {
        self.notification_log = Some(notification_log);
        self
    }

    /// Tear down the session; in-flight loads discard their results.
    pub fn shutdown(&self) {
        log::info!("[state] Shutting down feed");
        self.feed.shutdown();
    }
}
