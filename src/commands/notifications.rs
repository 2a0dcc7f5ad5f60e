//! Notification actions.
//!
//! Each action updates the local flag store and the loaded feed first, then
//! pushes the change to the backend in the background. Push failures are
//! logged, never returned.

use crate::error::AppError;
use crate::models::RawNotification;
use crate::services::NewNotification;
use crate::state::AppState;

fn require_id(id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::invalid_input_field("Notification id is required", "id"));
    }
    Ok(())
}

/// Mark one notification as read.
pub async fn mark_notification_read(state: &AppState, id: &str) -> Result<(), AppError> {
    require_id(id)?;

    state.store().set_read_flag(id, true).await;
    state
        .feed()
        .update(|snapshot| {
            if let Some(item) = snapshot.notifications.iter_mut().find(|n| n.id == id) {
                item.is_read = true;
            }
        })
        .await;

    drop(state.mirror().sync_read_state(id, true));
    Ok(())
}

/// Mark every unread notification in the loaded feed as read.
///
/// Returns how many notifications changed.
pub async fn mark_all_notifications_read(state: &AppState) -> Result<usize, AppError> {
    let unread: Vec<String> = state
        .feed()
        .snapshot()
        .await
        .notifications
        .into_iter()
        .filter(|n| !n.is_read)
        .map(|n| n.id)
        .collect();

    for id in &unread {
        state.store().set_read_flag(id, true).await;
    }

    state
        .feed()
        .update(|snapshot| {
            for item in snapshot.notifications.iter_mut() {
                if unread.contains(&item.id) {
                    item.is_read = true;
                }
            }
        })
        .await;

    for id in &unread {
        drop(state.mirror().sync_read_state(id, true));
    }

    log::info!("[feed] Marked {} notifications read", unread.len());
    Ok(unread.len())
}

/// Delete a notification. Deletions are permanent: the id stays in the
/// deleted set and is filtered out of every later load.
pub async fn delete_notification(state: &AppState, id: &str) -> Result<(), AppError> {
    require_id(id)?;

    state.store().add_deleted_id(id).await;
    state
        .feed()
        .update(|snapshot| snapshot.notifications.retain(|n| n.id != id))
        .await;

    drop(state.mirror().sync_deleted_state(id));
    Ok(())
}

/// Record a generated notification in the local log. It appears in the
/// feed on the next load.
pub async fn record_notification(
    state: &AppState,
    input: NewNotification,
) -> Result<RawNotification, AppError> {
    let notification_log = state
        .notification_log()
        .ok_or_else(|| AppError::internal("Notification log not available"))?;

    notification_log.record_notification(input).await
}
