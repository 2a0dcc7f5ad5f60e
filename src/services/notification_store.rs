//! Local notification flag store.
//!
//! Persists which notification ids were read and which were deleted. Every
//! operation is best-effort: storage failures are logged and swallowed, reads
//! fall back to defaults and failed writes are simply lost. The deleted list
//! is never rewritten from a failed read.

use crate::error::AppError;
use crate::services::key_value_store::KeyValueStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Key prefix for per-notification read flags.
const READ_KEY_PREFIX: &str = "notification_read_";

/// Key of the deleted notification id list.
const DELETED_KEY: &str = "deleted_notifications";

/// Read/deleted flags keyed by notification id.
#[derive(Clone)]
pub struct LocalNotificationStore {
    kv: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write of the deleted list across clones.
    deleted_lock: Arc<Mutex<()>>,
}

impl LocalNotificationStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            deleted_lock: Arc::new(Mutex::new(())),
        }
    }

    fn read_key(id: &str) -> String {
        format!("{}{}", READ_KEY_PREFIX, id)
    }

    /// Persisted read state, `false` when absent or unreadable.
    pub async fn get_read_flag(&self, id: &str) -> bool {
        match self.kv.get_bool(&Self::read_key(id)).await {
            Ok(value) => value.unwrap_or(false),
            Err(e) => {
                log::warn!("[store] Failed to read flag for {}: {}", id, e);
                false
            }
        }
    }

    /// Read state for each id in `ids`.
    pub async fn get_read_flags<'a, I>(&self, ids: I) -> HashMap<String, bool>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = HashMap::new();
        for id in ids {
            let read = self.get_read_flag(id).await;
            flags.insert(id.to_string(), read);
        }
        flags
    }

    pub async fn set_read_flag(&self, id: &str, value: bool) {
        if let Err(e) = self.kv.set_bool(&Self::read_key(id), value).await {
            log::warn!("[store] Failed to persist read flag for {}: {}", id, e);
        }
    }

    /// Every deleted id, empty when absent or unreadable.
    pub async fn get_deleted_ids(&self) -> HashSet<String> {
        match self.load_deleted_list().await {
            Ok(list) => list.into_iter().collect(),
            Err(e) => {
                log::warn!("[store] Failed to read deleted notifications: {}", e);
                HashSet::new()
            }
        }
    }

    /// Add `id` to the deleted set. Adding an id twice is a no-op.
    pub async fn add_deleted_id(&self, id: &str) {
        self.add_deleted_ids([id]).await;
    }

    /// Add every id in `ids` to the deleted set with a single write.
    ///
    /// Returns how many ids were new. When the current list cannot be read
    /// nothing is written, so earlier deletions are never overwritten.
    pub async fn add_deleted_ids<'a, I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let _guard = self.deleted_lock.lock().await;

        let mut deleted = match self.load_deleted_list().await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("[store] Failed to read deleted notifications, deletion not saved: {}", e);
                return 0;
            }
        };

        let before = deleted.len();
        for id in ids {
            if !deleted.iter().any(|existing| existing == id) {
                deleted.push(id.to_string());
            }
        }
        let added = deleted.len() - before;
        if added == 0 {
            return 0;
        }

        if let Err(e) = self.kv.set_string_list(DELETED_KEY, &deleted).await {
            log::warn!("[store] Failed to persist {} deletions: {}", added, e);
            return 0;
        }
        added
    }

    async fn load_deleted_list(&self) -> Result<Vec<String>, AppError> {
        Ok(self.kv.get_string_list(DELETED_KEY).await?.unwrap_or_default())
    }
}
