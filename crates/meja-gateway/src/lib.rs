//! # meja-gateway: Outbound Integrations for Meja
//!
//! Configuration plus every call that leaves the process: the restaurant's
//! ordering API, the Midtrans payment gateway, and table QR tokens.
//!
//! ## Module Structure
//! ```text
//! meja-gateway/src/
//! ├── lib.rs        ← You are here
//! ├── config.rs     ← MejaConfig (defaults → meja.toml → MEJA_* env)
//! ├── error.rs      ← GatewayError, GatewayResult
//! ├── upstream.rs   ← UpstreamClient, OrderSubmission
//! ├── payment.rs    ← PaymentClient (QRIS charge, status, cancel, webhook)
//! ├── poller.rs     ← PaymentPoller (one watch at a time, watch channel)
//! └── qr_token.rs   ← QrTokenVerifier (JWT, AES-256-GCM fallback)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meja_gateway::{MejaConfig, PaymentClient, PaymentPoller};
//! use std::{sync::Arc, time::Duration};
//!
//! let config = MejaConfig::load(None)?;
//! let payments = Arc::new(PaymentClient::new(&config.payment)?);
//! let poller = PaymentPoller::new(payments, Duration::from_secs(config.payment.poll_interval_secs));
//! let mut updates = poller.start("MEJA-20240101120000-1a2b3c4d");
//! updates.wait_for(|u| u.status.is_terminal()).await?;
//! ```

pub mod config;
pub mod error;
pub mod payment;
pub mod poller;
pub mod qr_token;
pub mod upstream;

pub use config::MejaConfig;
pub use error::{GatewayError, GatewayResult};
pub use payment::{
    new_order_id, signature_key, PaymentClient, PaymentNotification, QrisCharge, StatusSource,
    TransactionState,
};
pub use poller::{PaymentPoller, PollUpdate};
pub use qr_token::{QrTokenVerifier, TableClaims};
pub use upstream::{OrderSubmission, UpstreamClient};
