//! Published in-memory feed.
//!
//! Holds the lists the presentation layer renders. Reconciliation passes
//! take a generation ticket when they start; only the newest pass may
//! publish, and nothing is published once the feed has been shut down.

use crate::models::{NotificationItem, Reminder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Lists published by the last successful reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub reminders: Vec<Reminder>,
    pub notifications: Vec<NotificationItem>,
    /// Generation of the pass that published these lists; 0 before the first load.
    pub generation: u64,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Ticket handed to a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket(u64);

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Shared feed state.
#[derive(Debug, Default)]
pub struct FeedState {
    snapshot: RwLock<FeedSnapshot>,
    latest: AtomicU64,
    alive: CancellationToken,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass. Any pass started earlier becomes stale.
    pub fn begin_pass(&self) -> PassTicket {
        PassTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` still belongs to the newest pass of a live feed.
    pub fn is_current(&self, ticket: PassTicket) -> bool {
        !self.alive.is_cancelled() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Replace the published lists. Returns `false` and discards the lists
    /// when the pass is stale or the feed is shut down.
    pub async fn publish(
        &self,
        ticket: PassTicket,
        reminders: Vec<Reminder>,
        notifications: Vec<NotificationItem>,
    ) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if !self.is_current(ticket) {
            log::debug!("[feed] Discarding result of stale pass {}", ticket.0);
            return false;
        }

        *snapshot = FeedSnapshot {
            reminders,
            notifications,
            generation: ticket.0,
            loaded_at: Some(Utc::now()),
        };
        true
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Apply an in-place change to the published lists. No-op once shut down.
    pub async fn update<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut FeedSnapshot),
    {
        if !self.is_alive() {
            return false;
        }
        let mut snapshot = self.snapshot.write().await;
        change(&mut snapshot);
        true
    }

    pub fn is_alive(&self) -> bool {
        !self.alive.is_cancelled()
    }

    /// Mark the feed as torn down; in-flight passes discard their results.
    pub fn shutdown(&self) {
        self.alive.cancel();
    }

    /// Token cancelled on shutdown, for passes that want to stop early.
    pub fn cancellation(&self) -> CancellationToken {
        self.alive.clone()
    }
}
