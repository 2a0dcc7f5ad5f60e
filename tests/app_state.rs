//! Session wiring tests: `AppState::open` over a real SQLite database and
//! a mock backend.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use pocket_pilot_core::commands::{self, AppSettings};
use pocket_pilot_core::db;
use pocket_pilot_core::error::AppError;
use pocket_pilot_core::models::{ContentFilter, NotificationType};
use pocket_pilot_core::services::NewNotification;
use pocket_pilot_core::AppState;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

type Upserts = Arc<Mutex<Vec<Value>>>;

async fn spawn_backend() -> (String, Upserts) {
    let upserts: Upserts = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(
            "/auth/v1/user",
            get(|| async { Json(json!({"id": "user-1"})) }),
        )
        .route(
            "/rest/v1/reminders",
            get(|| async {
                Json(json!([{
                    "id": "r1",
                    "title": "Pay rent",
                    "description": "Flat",
                    "date": "2024-03-01T09:00:00Z",
                    "is_completed": false,
                    "recurrence": "monthly"
                }]))
            }),
        )
        .route(
            "/rest/v1/notification_states",
            get(|| async { Json(json!([])) }).post(
                |State(upserts): State<Upserts>, Json(body): Json<Value>| async move {
                    if let Value::Array(rows) = body {
                        upserts.lock().unwrap().extend(rows);
                    }
                    StatusCode::CREATED
                },
            ),
        )
        .with_state(upserts.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upserts)
}

fn write_settings(dir: &Path, base_url: &str) {
    let mut settings = AppSettings::default();
    settings.backend.base_url = base_url.to_string();
    settings.backend.api_key = "anon-key".to_string();
    commands::settings::save_settings(dir, &settings).unwrap();
}

fn alert(title: &str) -> NewNotification {
    NewNotification {
        title: title.to_string(),
        body: "Dining is at 90% of budget".to_string(),
        notification_type: NotificationType::BudgetAlert,
        date: None,
    }
}

#[tokio::test]
async fn test_open_without_backend_url_fails() {
    let dir = tempdir().unwrap();
    let err = AppState::open(dir.path(), "token").await.err().unwrap();
    assert!(matches!(err, AppError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_recorded_notification_appears_after_load() {
    let (url, upserts) = spawn_backend().await;
    let dir = tempdir().unwrap();
    write_settings(dir.path(), &url);

    let state = AppState::open(dir.path(), "token").await.unwrap();
    let recorded = commands::record_notification(&state, alert("Budget alert"))
        .await
        .unwrap();

    let outcome = commands::load_feed(&state).await.unwrap();
    assert!(outcome.published);
    assert!(outcome.remote_merged);
    assert_eq!(outcome.reminder_count, 1);
    assert_eq!(outcome.notification_count, 1);

    let feed = commands::get_feed(&state, ContentFilter::Notifications, None).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id(), recorded.id);
    assert_eq!(commands::get_unread_count(&state).await, 1);

    commands::mark_notification_read(&state, &recorded.id).await.unwrap();
    assert_eq!(commands::get_unread_count(&state).await, 0);

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    while upserts.lock().unwrap().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "push never arrived");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let pushed = upserts.lock().unwrap()[0].clone();
    assert_eq!(pushed["notification_id"], recorded.id.as_str());
    assert_eq!(pushed["is_read"], true);
}

#[tokio::test]
async fn test_flags_persist_across_sessions() {
    let (url, _upserts) = spawn_backend().await;
    let dir = tempdir().unwrap();
    write_settings(dir.path(), &url);

    let state = AppState::open(dir.path(), "token").await.unwrap();
    let kept = commands::record_notification(&state, alert("Kept")).await.unwrap();
    let gone = commands::record_notification(&state, alert("Gone")).await.unwrap();
    commands::load_feed(&state).await.unwrap();
    commands::delete_notification(&state, &gone.id).await.unwrap();
    state.shutdown();
    drop(state);

    let state = AppState::open(dir.path(), "token").await.unwrap();
    commands::load_feed(&state).await.unwrap();
    let snapshot = state.feed().snapshot().await;
    let ids: Vec<&str> = snapshot.notifications.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec![kept.id.as_str()]);
}

#[tokio::test]
async fn test_load_prunes_expired_notifications() {
    let (url, _upserts) = spawn_backend().await;
    let dir = tempdir().unwrap();
    write_settings(dir.path(), &url);
    let state = AppState::open(dir.path(), "token").await.unwrap();

    let old = commands::record_notification(&state, alert("Old")).await.unwrap();
    commands::record_notification(&state, alert("Fresh")).await.unwrap();

    // Backdate the first insert past the retention window.
    let pool = db::initialize(&db::get_db_path(dir.path())).await.unwrap();
    let expired = (Utc::now() - Duration::days(400)).timestamp();
    sqlx::query("UPDATE stored_notifications SET created_at = ? WHERE id = ?")
        .bind(expired)
        .bind(&old.id)
        .execute(&pool)
        .await
        .unwrap();

    let outcome = commands::load_feed(&state).await.unwrap();
    assert_eq!(outcome.notification_count, 1);
    let snapshot = state.feed().snapshot().await;
    assert_eq!(snapshot.notifications[0].title, "Fresh");
}

#[tokio::test]
async fn test_update_settings_persists_and_validates() {
    let (url, _upserts) = spawn_backend().await;
    let dir = tempdir().unwrap();
    write_settings(dir.path(), &url);
    let state = AppState::open(dir.path(), "token").await.unwrap();

    let mut settings = commands::get_settings(&state).await;
    settings.feed.notification_retention_days = 7;
    settings.feed.prune_on_load = false;
    commands::update_settings(&state, settings.clone()).await.unwrap();

    assert_eq!(commands::get_settings(&state).await, settings);
    assert_eq!(
        commands::settings::load_settings(dir.path()).unwrap(),
        settings
    );

    for days in [0, 200_000_000] {
        let mut invalid = settings.clone();
        invalid.feed.notification_retention_days = days;
        let err = commands::update_settings(&state, invalid).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
    assert_eq!(commands::get_settings(&state).await, settings);

    // A valid, enabled prune keeps working on load.
    assert!(commands::load_feed(&state).await.is_ok());
}

#[tokio::test]
async fn test_record_requires_title() {
    let (url, _upserts) = spawn_backend().await;
    let dir = tempdir().unwrap();
    write_settings(dir.path(), &url);
    let state = AppState::open(dir.path(), "token").await.unwrap();

    let err = commands::record_notification(&state, alert("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput { .. }));
}
