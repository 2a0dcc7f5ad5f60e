//! Database queries for the local notification log.
//!
//! The notification generator appends here; the feed loader reads the rows
//! back as raw records and parses them.

use crate::db::pool::DbPool;
use crate::models::RawNotification;

/// Insert a notification record. An existing record with the same id is replaced.
pub async fn insert_notification(pool: &DbPool, record: &RawNotification) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO stored_notifications (id, title, body, date, type)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            body = excluded.body,
            date = excluded.date,
            type = excluded.type
        "#,
    )
    .bind(&record.id)
    .bind(&record.title)
    .bind(&record.body)
    .bind(&record.date)
    .bind(&record.type_tag)
    .execute(pool)
    .await?;

    Ok(())
}

/// List every stored notification, newest insert first.
pub async fn list_notifications(pool: &DbPool) -> Result<Vec<RawNotification>, sqlx::Error> {
    sqlx::query_as::<_, RawNotification>(
        r#"
        SELECT id, title, body, date, type AS type_tag
        FROM stored_notifications
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Delete records inserted before `cutoff` (Unix seconds). Returns the number removed.
pub async fn delete_created_before(pool: &DbPool, cutoff: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stored_notifications WHERE created_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
