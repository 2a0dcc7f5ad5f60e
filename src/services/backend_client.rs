//! Backend REST client.
//!
//! Talks to the app's PostgREST-style backend: `/auth/v1` to resolve the
//! signed-in user, `/rest/v1/reminders` for reminder CRUD and
//! `/rest/v1/notification_states` for the read/deleted flag mirror.

use crate::error::AppError;
use crate::models::{Reminder, RemoteFlagMap, RemoteFlagState};
use crate::services::sources::{ReminderSource, RemoteFlagBackend};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

const REMINDERS_ENDPOINT: &str = "/rest/v1/reminders";
const NOTIFICATION_STATES_ENDPOINT: &str = "/rest/v1/notification_states";
const CURRENT_USER_ENDPOINT: &str = "/auth/v1/user";

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Base URL of the backend project (e.g., `https://xyz.supabase.co`).
    pub base_url: String,

    /// Public API key sent with every request.
    pub api_key: String,

    /// Access token of the signed-in session.
    pub access_token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            access_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Authenticated user from `/auth/v1/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Row of the `notification_states` table.
#[derive(Debug, Clone, Deserialize)]
struct NotificationStateRow {
    notification_id: String,
    #[serde(default)]
    is_read: Option<bool>,
    #[serde(default)]
    is_deleted: Option<bool>,
}

/// Upsert payload for `notification_states`; absent columns are left untouched.
#[derive(Debug, Clone, Serialize)]
struct NotificationStateUpsert<'a> {
    user_id: &'a str,
    notification_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_deleted: Option<bool>,
    updated_at: String,
}

/// Backend REST client. The resolved user id is cached for the client's lifetime.
#[derive(Debug)]
pub struct BackendClient {
    client: Client,
    config: BackendClientConfig,
    user_id: OnceCell<String>,
}

impl BackendClient {
    /// Create a new backend client.
    pub fn new(config: BackendClientConfig) -> Result<Self, AppError> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Backend URL is not configured",
                "base_url",
            ));
        }

        let mut headers = header::HeaderMap::new();

        let api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| AppError::authentication("Invalid API key format"))?;
        headers.insert("apikey", api_key);

        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| AppError::authentication("Invalid access token format"))?;
        headers.insert(header::AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            user_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Map a non-success response to an [`AppError`].
    async fn error_from_response(response: Response, endpoint: &str) -> AppError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return AppError::authentication_expired("Session expired. Please sign in again.");
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        // PostgREST errors look like {"message": "...", "code": "..."}; auth errors use "msg"
        let body_message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("msg"))
                    .or_else(|| v.get("error"))
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
            });

        let message = match (status, body_message) {
            (StatusCode::FORBIDDEN, _) => "Access denied".to_string(),
            (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
            (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
            (_, Some(msg)) => msg,
            _ => format!("Request failed ({}): {}", status_code, body),
        };

        AppError::backend(message, status_code, endpoint)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let response = request.send().await?;

        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else {
            Err(Self::error_from_response(response, endpoint).await)
        }
    }

    async fn send_empty(&self, request: RequestBuilder, endpoint: &str) -> Result<(), AppError> {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, endpoint).await)
        }
    }

    /// Fetch the signed-in user.
    pub async fn get_current_user(&self) -> Result<BackendUser, AppError> {
        let request = self.client.get(self.url(CURRENT_USER_ENDPOINT));
        self.send_json(request, CURRENT_USER_ENDPOINT).await
    }

    async fn user_id(&self) -> Result<&str, AppError> {
        let id = self
            .user_id
            .get_or_try_init(|| async { self.get_current_user().await.map(|u| u.id) })
            .await?;
        Ok(id.as_str())
    }

    async fn upsert_state(&self, row: NotificationStateUpsert<'_>) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.url(NOTIFICATION_STATES_ENDPOINT))
            .query(&[("on_conflict", "user_id,notification_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);

        self.send_empty(request, NOTIFICATION_STATES_ENDPOINT).await
    }

    /// Run a reminder mutation that returns the affected rows; no rows means
    /// the reminder does not exist for this user.
    async fn mutate_reminder(&self, request: RequestBuilder, id: &str) -> Result<(), AppError> {
        let rows: Vec<serde_json::Value> = self
            .send_json(
                request.header("Prefer", "return=representation"),
                REMINDERS_ENDPOINT,
            )
            .await?;

        if rows.is_empty() {
            return Err(AppError::not_found_with_id("Reminder", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ReminderSource for BackendClient {
    async fn fetch_reminders(&self) -> Result<Vec<Reminder>, AppError> {
        let user_id = self.user_id().await?;
        let request = self.client.get(self.url(REMINDERS_ENDPOINT)).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "date.desc".to_string()),
        ]);

        self.send_json(request, REMINDERS_ENDPOINT).await
    }

    async fn delete_reminder(&self, id: &str) -> Result<(), AppError> {
        let user_id = self.user_id().await?;
        let request = self
            .client
            .delete(self.url(REMINDERS_ENDPOINT))
            .query(&[("id", format!("eq.{}", id)), ("user_id", format!("eq.{}", user_id))]);

        self.mutate_reminder(request, id).await
    }

    async fn mark_reminder_completed(&self, id: &str) -> Result<(), AppError> {
        let user_id = self.user_id().await?;
        let request = self
            .client
            .patch(self.url(REMINDERS_ENDPOINT))
            .query(&[("id", format!("eq.{}", id)), ("user_id", format!("eq.{}", user_id))])
            .json(&serde_json::json!({ "is_completed": true }));

        self.mutate_reminder(request, id).await
    }
}

#[async_trait]
impl RemoteFlagBackend for BackendClient {
    async fn current_user_id(&self) -> Result<String, AppError> {
        self.user_id().await.map(str::to_string)
    }

    async fn fetch_flags(&self, user_id: &str) -> Result<RemoteFlagMap, AppError> {
        let request = self
            .client
            .get(self.url(NOTIFICATION_STATES_ENDPOINT))
            .query(&[
                ("select", "notification_id,is_read,is_deleted".to_string()),
                ("user_id", format!("eq.{}", user_id)),
            ]);

        let rows: Vec<NotificationStateRow> =
            self.send_json(request, NOTIFICATION_STATES_ENDPOINT).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let state = RemoteFlagState {
                    read: row.is_read.unwrap_or(false),
                    deleted: row.is_deleted.unwrap_or(false),
                };
                (row.notification_id, state)
            })
            .collect())
    }

    async fn upsert_read_flag(&self, user_id: &str, id: &str, read: bool) -> Result<(), AppError> {
        self.upsert_state(NotificationStateUpsert {
            user_id,
            notification_id: id,
            is_read: Some(read),
            is_deleted: None,
            updated_at: Utc::now().to_rfc3339(),
        })
        .await
    }

    async fn upsert_deleted_flag(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        self.upsert_state(NotificationStateUpsert {
            user_id,
            notification_id: id,
            is_read: None,
            is_deleted: Some(true),
            updated_at: Utc::now().to_rfc3339(),
        })
        .await
    }
}
