//! # meja-core: Pricing and Cart Normalisation for Meja
//!
//! Every screen that shows money (checkout, order status, bill) and the
//! order submission builder go through this crate, so they agree with each
//! other by construction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Meja Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 apps/meja-api (axum handlers)                   │    │
//! │  │   cart CRUD ──► checkout ──► payment status ──► order status    │    │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘    │
//! │                  │                             │                        │
//! │  ┌───────────────▼─────────────────────────────▼───────────────────┐    │
//! │  │               ★ meja-core (THIS CRATE) ★                        │    │
//! │  │                                                                 │    │
//! │  │   boundary ──► types ──► calculator ──► aggregate               │    │
//! │  │  (untrusted   LineItem   LineAmounts    CartTotals              │    │
//! │  │    JSON)                      │                                 │    │
//! │  │                               └───────► normalize               │    │
//! │  │                                         OrderPayload            │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • TOTAL FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                  │                             │                        │
//! │        meja-db (cart, sessions)      meja-gateway (upstream, Midtrans)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer Rupiah amounts with half-up percent rounding
//! - [`tax`] - PB1 / PPN categories and buckets
//! - [`types`] - Line items, combos, condiments, tax rates
//! - [`boundary`] - Parsing untrusted JSON into [`types`]
//! - [`calculator`] - Base and taxes for one line item
//! - [`aggregate`] - Cart totals with per-view rounding
//! - [`normalize`] - Order submission payload
//! - [`session`] - User and payment session records
//! - [`status`] - Payment and order status mapping
//! - [`validation`] - Input checks for the request edge
//! - [`error`] - Domain error types
//!
//! ## Example
//!
//! ```rust
//! use meja_core::{aggregate_for, Money, MenuLine, PricingView, TaxRate};
//!
//! let items = vec![MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
//!     .with_quantity(2)
//!     .with_tax(TaxRate::new("PB1", 10.0))
//!     .into()];
//!
//! let totals = aggregate_for(&items, PricingView::Checkout);
//! assert_eq!(totals.subtotal.amount(), 36_000);
//! assert_eq!(totals.service_tax.amount(), 3_600);
//! assert_eq!(totals.grand_total.amount(), 39_600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod boundary;
pub mod calculator;
pub mod error;
pub mod money;
pub mod normalize;
pub mod session;
pub mod status;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{aggregate, aggregate_for, CartTotals, PricingView, RoundingPolicy};
pub use boundary::{parse_line_item, parse_order_lines};
pub use calculator::{calculate_line, LineAmounts};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use normalize::{normalize_order, OrderPayload};
pub use session::{OrderType, PaymentSession, UserSession};
pub use status::{OrderProgress, PaymentStatus};
pub use tax::{TaxBuckets, TaxCategory};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Grand totals are rounded to a multiple of this many Rupiah.
pub const ROUNDING_UNIT: i64 = 100;

/// Quantity assumed when a source omits it or sends an invalid one.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Maximum distinct entries in a cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity a customer may enter for one entry.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Upper bound for any quantity read from stored or upstream data. Keeps
/// the multiplied-out combo quantities far from integer overflow.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum length of a kitchen note.
pub const MAX_NOTE_LENGTH: usize = 200;
