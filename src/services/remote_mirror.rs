//! Remote mirror of notification flags.
//!
//! Keeps the per-user read/deleted flags on the backend in step with the
//! local flag store:
//! - On load, remote flags are pulled and overwrite local ones (remote wins)
//! - On user actions, the changed flag is pushed in the background
//!
//! A remote `deleted: false` never clears a local deletion; deletions only
//! ever flow into the local deleted set.

use crate::error::AppError;
use crate::services::notification_store::LocalNotificationStore;
use crate::services::sources::RemoteFlagBackend;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

/// Counts from one remote-to-local merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Read flags written to the local store.
    pub read_flags: usize,
    /// Ids added (or re-confirmed) in the local deleted set.
    pub deletions: usize,
}

/// Sync client between the local flag store and the backend.
#[derive(Clone)]
pub struct RemoteMirror {
    backend: Arc<dyn RemoteFlagBackend>,
    store: LocalNotificationStore,
    user_id: Arc<OnceCell<String>>,
}

impl RemoteMirror {
    pub fn new(backend: Arc<dyn RemoteFlagBackend>, store: LocalNotificationStore) -> Self {
        Self {
            backend,
            store,
            user_id: Arc::new(OnceCell::new()),
        }
    }

    /// Resolve the user scope. Later calls reuse the first successful result;
    /// a failed call can be retried.
    pub async fn initialize(&self) -> Result<(), AppError> {
        self.user_id
            .get_or_try_init(|| async {
                let id = self.backend.current_user_id().await?;
                log::info!("[mirror] Initialized for user {}", id);
                Ok::<_, AppError>(id)
            })
            .await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.user_id.initialized()
    }

    fn require_user(&self) -> Result<&str, AppError> {
        self.user_id
            .get()
            .map(String::as_str)
            .ok_or_else(|| AppError::sync("Remote mirror used before initialize()"))
    }

    /// Pull every remote flag and write it into the local store.
    pub async fn apply_remote_states_to_local(&self) -> Result<MergeSummary, AppError> {
        let user_id = self.require_user()?;
        let flags = self.backend.fetch_flags(user_id).await?;

        let mut summary = MergeSummary::default();
        for (id, state) in &flags {
            self.store.set_read_flag(id, state.read).await;
            summary.read_flags += 1;
        }

        let deleted: Vec<&str> = flags
            .iter()
            .filter(|(_, state)| state.deleted)
            .map(|(id, _)| id.as_str())
            .collect();
        summary.deletions = deleted.len();
        self.store.add_deleted_ids(deleted).await;

        log::debug!(
            "[mirror] Applied {} remote read flags, {} deletions",
            summary.read_flags,
            summary.deletions
        );
        Ok(summary)
    }

    /// Push a read-state change and wait for the result.
    pub async fn push_read_state(&self, id: &str, is_read: bool) -> Result<(), AppError> {
        let user_id = self.require_user()?;
        self.backend
            .upsert_read_flag(user_id, id, is_read)
            .await
            .map_err(|e| AppError::sync_for_notification(e.to_string(), id))
    }

    /// Push a deletion and wait for the result.
    pub async fn push_deleted_state(&self, id: &str) -> Result<(), AppError> {
        let user_id = self.require_user()?;
        self.backend
            .upsert_deleted_flag(user_id, id)
            .await
            .map_err(|e| AppError::sync_for_notification(e.to_string(), id))
    }

    /// Push a read-state change in the background. Errors are only logged;
    /// the handle may be dropped.
    pub fn sync_read_state(&self, id: &str, is_read: bool) -> JoinHandle<()> {
        let mirror = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = mirror.push_read_state(&id, is_read).await {
                log::warn!("[mirror] Failed to push read state for {}: {}", id, e);
            }
        })
    }

    /// Push a deletion in the background. Errors are only logged; the handle
    /// may be dropped.
    pub fn sync_deleted_state(&self, id: &str) -> JoinHandle<()> {
        let mirror = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = mirror.push_deleted_state(&id).await {
                log::warn!("[mirror] Failed to push deletion for {}: {}", id, e);
            }
        })
    }
}
