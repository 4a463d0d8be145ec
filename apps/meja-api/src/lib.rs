//! # Meja API
//!
//! HTTP server for QR table ordering.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan QR ──► POST /api/session/qr ──► UserSession saved                 │
//! │                                                                         │
//! │  browse  ──► GET  /api/stores/{store}/menus     (restaurant API proxy)  │
//! │                                                                         │
//! │  cart    ──► GET/POST/DELETE /api/cart, PUT/DELETE /api/cart/{index}    │
//! │              every response carries the checkout totals                 │
//! │                                                                         │
//! │  pay     ──► POST /api/checkout                                         │
//! │                 normalise → save PaymentSession → submit order          │
//! │                 → QRIS charge → start poller → clear cart               │
//! │                                                                         │
//! │  follow  ──► GET /api/payments/{order_id}/status                        │
//! │              GET /api/orders/{code}                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::{AppState, SharedState};
