//! # Key-Value Store
//!
//! The persistence substrate: string keys, whole JSON documents as values,
//! no partial updates and no transactions.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    dyn KeyValueStore                                    │
//! │                           │                                             │
//! │          ┌────────────────┴────────────────┐                            │
//! │          ▼                                 ▼                            │
//! │   SqliteStore                        MemoryStore                        │
//! │   kv_store table                     HashMap behind a RwLock            │
//! │   (production)                       (tests, ephemeral deployments)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories receive an `Arc<dyn KeyValueStore>` so tests can swap the
//! substrate without touching the code under test.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Key holding the cart line items.
pub const CART_KEY: &str = "cart";

/// Key holding the checkout snapshot.
pub const PAYMENT_SESSION_KEY: &str = "payment_session";

/// Key holding the user session.
pub const USER_KEY: &str = "user";

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;

// =============================================================================
// Trait
// =============================================================================

/// Whole-value string storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, `None` if absent.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Replaces the value under `key`.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> DbResult<()>;
}

/// Reads and decodes a JSON value.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> DbResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DbError::invalid_value(key, e)),
        None => Ok(None),
    }
}

/// Encodes and writes a JSON value.
pub async fn write_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> DbResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| DbError::invalid_value(key, e))?;
    store.set(key, &raw).await
}

// =============================================================================
// SQLite
// =============================================================================

/// Store backed by the `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing value");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        debug!(key = %key, "Removing value");

        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// Store that keeps everything in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
