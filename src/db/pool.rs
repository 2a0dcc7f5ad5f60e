//! SQLite connection pool with WAL mode.
//!
//! The feed core is single-owner, but the notification generator and the
//! reconciliation pass can both hit the database from different tasks, so
//! WAL keeps readers from blocking on the occasional flag write.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Create a new connection pool with WAL mode enabled.
///
/// The database file is created if missing; its parent directory must exist.
pub async fn create_pool(db_path: &Path) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::new()
        .filename(db_path)
        // Creates the file only; the directory must already exist
        .create_if_missing(true)
        // Feed reads keep going while a flag or log write commits
        .journal_mode(SqliteJournalMode::Wal)
        // NORMAL is durable enough under WAL for preferences and the log
        .synchronous(SqliteSynchronous::Normal)
        // Wait out a writer in another task instead of failing with SQLITE_BUSY
        .busy_timeout(Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        // Writers serialize on the WAL lock anyway, so a few connections suffice
        .max_connections(4)
        // One warm connection for the load on app open
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await?;

    // Some filesystems refuse WAL and silently keep the rollback journal
    let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;

    if !mode.0.eq_ignore_ascii_case("wal") {
        log::warn!("[db] WAL mode not active, journal_mode={}", mode.0);
    }

    Ok(pool)
}
