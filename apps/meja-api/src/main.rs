//! # Meja API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Meja API Server                                │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► Handlers ───► SQLite (kv_store)         │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                       Restaurant API / Midtrans                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use meja_api::{router, AppState};
use meja_db::{Database, DbConfig, MemoryStore, SharedStore};
use meja_gateway::MejaConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,meja=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Meja API server...");

    let config = MejaConfig::load(None).context("Failed to load configuration")?;
    info!(
        addr = %config.server.bind_address(),
        upstream = %config.upstream.base_url,
        payment = %config.payment.base_url,
        "Configuration loaded"
    );

    let (store, database) = open_storage(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), store).await?);
    let app = router(state.clone());

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    state.poller.cancel();
    if let Some(db) = database {
        db.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// SQLite unless `storage.in_memory` is set.
async fn open_storage(config: &MejaConfig) -> anyhow::Result<(SharedStore, Option<Database>)> {
    if config.storage.in_memory {
        warn!("Using in-memory storage, carts are lost on restart");
        return Ok((MemoryStore::shared(), None));
    }

    let path = config.storage.resolved_database_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(
        DbConfig::new(path.clone()).max_connections(config.storage.max_connections),
    )
    .await
    .context("Failed to open database")?;
    info!(path = %path.display(), "Database ready");

    let store: SharedStore = Arc::new(db.kv());
    Ok((store, Some(db)))
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
