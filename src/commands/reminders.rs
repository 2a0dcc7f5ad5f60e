//! Reminder actions.
//!
//! These go to the backend first; the loaded feed only changes once the
//! backend accepted the change.

use crate::error::AppError;
use crate::state::AppState;

/// Delete a reminder.
pub async fn delete_reminder(state: &AppState, id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::invalid_input_field("Reminder id is required", "id"));
    }

    state.reminders().delete_reminder(id).await?;
    state
        .feed()
        .update(|snapshot| snapshot.reminders.retain(|r| r.id != id))
        .await;

    Ok(())
}

/// Mark a reminder as completed.
pub async fn complete_reminder(state: &AppState, id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::invalid_input_field("Reminder id is required", "id"));
    }

    state.reminders().mark_reminder_completed(id).await?;
    state
        .feed()
        .update(|snapshot| {
            if let Some(reminder) = snapshot.reminders.iter_mut().find(|r| r.id == id) {
                reminder.is_completed = true;
            }
        })
        .await;

    Ok(())
}
