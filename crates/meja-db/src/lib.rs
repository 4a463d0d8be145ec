//! # meja-db: Storage Layer for Meja
//!
//! A key-value substrate (SQLite in production, memory in tests) and the
//! repositories for the cart and the two session records.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Meja Data Flow                                   │
//! │                                                                         │
//! │  axum handler (POST /api/cart)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     meja-db (THIS CRATE)                        │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │  CartStore     │    │  (embedded)  │   │    │
//! │  │   │ SqlitePool    │◄───│  Session       │    │ 001_kv_store │   │    │
//! │  │   │               │    │  PaymentSess.  │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │           ▲                    │                                │    │
//! │  │           └──── kv.rs ◄────────┘  (KeyValueStore trait)         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meja_db::{CartStore, Database, DbConfig};
//! use std::sync::Arc;
//!
//! let db = Database::new(DbConfig::new("meja.db")).await?;
//! let mut cart = CartStore::load(Arc::new(db.kv())).await;
//! cart.append(item).await;
//! ```

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryStore, SharedStore, SqliteStore};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartStore;
pub use repository::payment::PaymentSessionRepository;
pub use repository::session::SessionRepository;
