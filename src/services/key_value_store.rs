//! Typed key-value preference storage.
//!
//! [`KeyValueStore`] is the narrow interface the notification flag store is
//! written against. [`SqlitePreferences`] persists to the local database;
//! [`InMemoryPreferences`] lives for the process only.

use crate::db::pool::DbPool;
use crate::db::preferences;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable string-keyed storage for booleans and string lists.
///
/// Reads return `Ok(None)` for missing keys and for values of another type.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, AppError>;
    async fn set_bool(&self, key: &str, value: bool) -> Result<(), AppError>;
    async fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, AppError>;
    async fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), AppError>;
}

fn as_string_list(value: Value) -> Option<Vec<String>> {
    serde_json::from_value(value).ok()
}

/// Preferences stored in the `preferences` table as JSON text.
#[derive(Debug, Clone)]
pub struct SqlitePreferences {
    pool: DbPool,
}

impl SqlitePreferences {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn get_json(&self, key: &str) -> Result<Option<Value>, AppError> {
        let Some(raw) = preferences::get_value(&self.pool, key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("[store] Ignoring corrupt preference {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_json(&self, key: &str, value: Value) -> Result<(), AppError> {
        preferences::set_value(&self.pool, key, &value.to_string())
            .await
            .map_err(|e| AppError::database_with_op(e.to_string(), format!("set {}", key)))
    }
}

#[async_trait]
impl KeyValueStore for SqlitePreferences {
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, AppError> {
        Ok(self.get_json(key).await?.and_then(|v| v.as_bool()))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<(), AppError> {
        self.set_json(key, Value::Bool(value)).await
    }

    async fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, AppError> {
        Ok(self.get_json(key).await?.and_then(as_string_list))
    }

    async fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), AppError> {
        self.set_json(key, serde_json::to_value(value)?).await
    }
}

/// Process-local preferences.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: Mutex<HashMap<String, Value>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::internal("Preference lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::internal("Preference lock poisoned"))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryPreferences {
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, AppError> {
        Ok(self.get(key)?.and_then(|v| v.as_bool()))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<(), AppError> {
        self.set(key, Value::Bool(value))
    }

    async fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, AppError> {
        Ok(self.get(key)?.and_then(as_string_list))
    }

    async fn set_string_list(&self, key: &str, value: &[String]) -> Result<(), AppError> {
        self.set(key, serde_json::to_value(value)?)
    }
}
