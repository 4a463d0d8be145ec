//! # SQLite Handle
//!
//! Opens the database file behind [`SqliteStore`] and applies migrations.
//!
//! ```text
//! [storage] in meja.toml
//!        │
//!        ▼
//! DbConfig::new(path).max_connections(n)
//!        │
//!        ▼
//! Database::new ──► pool (WAL, NORMAL sync) ──► migrations ──► db.kv()
//! ```
//!
//! The store holds three small documents, so the pool stays small. WAL lets a
//! status read proceed while a cart write is in progress.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::kv::SqliteStore;
use crate::migrations;

/// Where and how to open the database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database file, created when missing. `None` opens a private
    /// in-memory database.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
    pub migrate: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// A throwaway database for tests. One connection, because every
    /// in-memory connection would see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new().busy_timeout(self.busy_timeout);
        match &self.path {
            Some(path) => options
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            None => options.in_memory(true),
        }
    }

    fn describe(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }
}

/// Open database. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let target = config.describe();
        info!(path = %target, max_connections = config.max_connections, "Opening database");

        // The in-memory database lives exactly as long as its one connection.
        let idle_timeout = config.path.as_ref().map(|_| Duration::from_secs(600));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .idle_timeout(idle_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", target, e)))?;

        let db = Database { pool };
        if config.migrate {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The key-value store over this database.
    pub fn kv(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
