//! # Repository Module
//!
//! Typed access to the records kept in the key-value store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │     │                                                                   │
//! │     ├── CartStore                  "cart"             Vec<LineItem>     │
//! │     ├── SessionRepository          "user"             UserSession       │
//! │     └── PaymentSessionRepository   "payment_session"  PaymentSession    │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │              Arc<dyn KeyValueStore>                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart swallows storage errors (the customer keeps what they see); the
//! session repositories report them because checkout cannot continue
//! without them.

pub mod cart;
pub mod payment;
pub mod session;
