//! Shared fakes for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pocket_pilot_core::commands::AppSettings;
use pocket_pilot_core::error::AppError;
use pocket_pilot_core::models::{
    RawNotification, Recurrence, Reminder, RemoteFlagMap, RemoteFlagState,
};
use pocket_pilot_core::services::{
    InMemoryPreferences, KeyValueStore, NotificationSource, ReminderSource, RemoteFlagBackend,
};
use pocket_pilot_core::{AppState, Collaborators};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A flag change pushed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Push {
    Read(String, bool),
    Deleted(String),
}

/// In-memory backend: reminders plus the per-user flag table.
#[derive(Default)]
pub struct FakeBackend {
    pub flags: Mutex<RemoteFlagMap>,
    pub reminders: Mutex<Vec<Reminder>>,
    pub pushes: Mutex<Vec<Push>>,
    pub offline: AtomicBool,
    /// Fail only the flag table, leaving reminders reachable.
    pub flags_offline: AtomicBool,
}

impl FakeBackend {
    pub fn with_flags(flags: &[(&str, bool, bool)]) -> Self {
        let backend = Self::default();
        {
            let mut map = backend.flags.lock().unwrap();
            for (id, read, deleted) in flags {
                map.insert(
                    id.to_string(),
                    RemoteFlagState {
                        read: *read,
                        deleted: *deleted,
                    },
                );
            }
        }
        backend
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_flags_offline(&self, offline: bool) {
        self.flags_offline.store(offline, Ordering::SeqCst);
    }

    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::network("backend unreachable"));
        }
        Ok(())
    }

    fn check_flags_online(&self) -> Result<(), AppError> {
        self.check_online()?;
        if self.flags_offline.load(Ordering::SeqCst) {
            return Err(AppError::network("flag table unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteFlagBackend for FakeBackend {
    async fn current_user_id(&self) -> Result<String, AppError> {
        self.check_flags_online()?;
        Ok("user-1".to_string())
    }

    async fn fetch_flags(&self, _user_id: &str) -> Result<RemoteFlagMap, AppError> {
        self.check_flags_online()?;
        Ok(self.flags.lock().unwrap().clone())
    }

    async fn upsert_read_flag(&self, _user_id: &str, id: &str, read: bool) -> Result<(), AppError> {
        self.check_flags_online()?;
        self.flags
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .read = read;
        self.pushes
            .lock()
            .unwrap()
            .push(Push::Read(id.to_string(), read));
        Ok(())
    }

    async fn upsert_deleted_flag(&self, _user_id: &str, id: &str) -> Result<(), AppError> {
        self.check_flags_online()?;
        self.flags
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .deleted = true;
        self.pushes.lock().unwrap().push(Push::Deleted(id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ReminderSource for FakeBackend {
    async fn fetch_reminders(&self) -> Result<Vec<Reminder>, AppError> {
        self.check_online()?;
        Ok(self.reminders.lock().unwrap().clone())
    }

    async fn delete_reminder(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        let mut reminders = self.reminders.lock().unwrap();
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Err(AppError::not_found_with_id("Reminder", id));
        }
        Ok(())
    }

    async fn mark_reminder_completed(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        let mut reminders = self.reminders.lock().unwrap();
        match reminders.iter_mut().find(|r| r.id == id) {
            Some(reminder) => {
                reminder.is_completed = true;
                Ok(())
            }
            None => Err(AppError::not_found_with_id("Reminder", id)),
        }
    }
}

/// Notification generator output. Each fetch snapshots the records first,
/// then waits out the next queued delay.
#[derive(Default)]
pub struct FakeNotifications {
    pub records: Mutex<Vec<RawNotification>>,
    pub delays: Mutex<VecDeque<Duration>>,
    pub failing: AtomicBool,
}

impl FakeNotifications {
    pub fn with_records(records: Vec<RawNotification>) -> Self {
        let source = Self::default();
        *source.records.lock().unwrap() = records;
        source
    }

    pub fn replace(&self, records: Vec<RawNotification>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn queue_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }
}

#[async_trait]
impl NotificationSource for FakeNotifications {
    async fn fetch_stored_notifications(&self) -> Result<Vec<RawNotification>, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::database("notification store unavailable"));
        }
        let records = self.records.lock().unwrap().clone();
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }
}

/// Everything a test needs to drive and inspect one session.
pub struct Harness {
    pub state: AppState,
    pub backend: Arc<FakeBackend>,
    pub notifications: Arc<FakeNotifications>,
    pub preferences: Arc<InMemoryPreferences>,
}

pub fn harness(backend: FakeBackend, notifications: FakeNotifications) -> Harness {
    let backend = Arc::new(backend);
    let notifications = Arc::new(notifications);
    let preferences = Arc::new(InMemoryPreferences::new());

    let collaborators = Collaborators {
        preferences: preferences.clone() as Arc<dyn KeyValueStore>,
        flag_backend: backend.clone(),
        reminders: backend.clone(),
        notifications: notifications.clone(),
    };
    let state = AppState::from_collaborators(
        std::env::temp_dir(),
        AppSettings::default(),
        collaborators,
    );

    Harness {
        state,
        backend,
        notifications,
        preferences,
    }
}

pub fn on(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

pub fn raw(id: &str, type_tag: &str, date: DateTime<Utc>) -> RawNotification {
    RawNotification {
        id: id.to_string(),
        title: format!("Title {}", id),
        body: format!("Body {}", id),
        date: date.to_rfc3339(),
        type_tag: type_tag.to_string(),
    }
}

pub fn reminder(id: &str, date: DateTime<Utc>, completed: bool) -> Reminder {
    Reminder {
        id: id.to_string(),
        title: format!("Reminder {}", id),
        description: String::new(),
        date,
        is_completed: completed,
        recurrence: Recurrence::None,
    }
}

/// Wait until `check` holds, failing the test after two seconds.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
