//! HTTP routes.
//!
//! | Method | Path                              | Handler                 |
//! |--------|-----------------------------------|-------------------------|
//! | GET    | /health                           | health::health          |
//! | GET    | /api/session                      | session::current        |
//! | POST   | /api/session/qr                   | session::scan_qr        |
//! | GET    | /api/stores/{store}/menus         | catalogue::menus        |
//! | GET    | /api/stores/{store}/categories    | catalogue::categories   |
//! | GET    | /api/cart                         | cart::list              |
//! | POST   | /api/cart                         | cart::append            |
//! | DELETE | /api/cart                         | cart::clear             |
//! | PUT    | /api/cart/{index}                 | cart::replace           |
//! | DELETE | /api/cart/{index}                 | cart::remove            |
//! | POST   | /api/pricing/{view}               | pricing::price          |
//! | GET    | /api/checkout                     | checkout::current       |
//! | POST   | /api/checkout                     | checkout::checkout      |
//! | GET    | /api/orders/{code}                | orders::show            |
//! | GET    | /api/payments/{order_id}/status   | payments::status        |
//! | POST   | /api/payments/{order_id}/cancel   | payments::cancel        |
//! | POST   | /api/payments/notify              | payments::notify        |

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub mod cart;
pub mod catalogue;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod session;

/// Builds the router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/session", get(session::current))
        .route("/api/session/qr", post(session::scan_qr))
        .route("/api/stores/{store}/menus", get(catalogue::menus))
        .route("/api/stores/{store}/categories", get(catalogue::categories))
        .route(
            "/api/cart",
            get(cart::list).post(cart::append).delete(cart::clear),
        )
        .route("/api/cart/{index}", put(cart::replace).delete(cart::remove))
        .route("/api/pricing/{view}", post(pricing::price))
        .route(
            "/api/checkout",
            get(checkout::current).post(checkout::checkout),
        )
        .route("/api/orders/{code}", get(orders::show))
        .route("/api/payments/notify", post(payments::notify))
        .route("/api/payments/{order_id}/status", get(payments::status))
        .route("/api/payments/{order_id}/cancel", post(payments::cancel))
        .with_state(state)
}
