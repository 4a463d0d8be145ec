//! Checkout: turns the cart into an upstream order and a QRIS charge.
//!
//! ```text
//! cart ──► normalize_order ──► PaymentSession (saved)
//!                                   │
//!                                   ├──► POST {upstream}/stores/{store}/orders ──► order code
//!                                   ├──► POST /v2/charge ──► QR string
//!                                   └──► poller.start(order_id)
//! ```
//!
//! The cart is cleared only when every step succeeded, so a failed
//! checkout can be retried as is. A retry with an unchanged cart reuses the
//! order already accepted upstream and only repeats the charge.

use axum::extract::State;
use axum::Json;
use meja_core::{normalize_order, CoreError, LineItem, OrderPayload, PaymentSession, UserSession};
use meja_gateway::{new_order_id, GatewayError, OrderSubmission, QrisCharge};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub order_code: String,
    pub payment: QrisCharge,
    pub order: OrderPayload,
}

/// The snapshot of the last checkout.
pub async fn current(State(state): State<SharedState>) -> ApiResult<Json<PaymentSession>> {
    let session = state
        .payment_sessions
        .get()
        .await?
        .ok_or_else(|| ApiError::NotFound("no checkout in progress".into()))?;
    Ok(Json(session))
}

pub async fn checkout(State(state): State<SharedState>) -> ApiResult<Json<CheckoutResponse>> {
    let user = state.sessions.get().await?.ok_or(CoreError::NoSession)?;

    // Held to the end: no cart edits while the order is in flight.
    let mut cart = state.cart.lock().await;
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let items = cart.list().to_vec();
    let (session, order_code) = submit_or_resume(&state, &user, items).await?;
    let order_id = session.order_id.clone();

    let payment = state
        .payments
        .charge_qris(&order_id, session.payment_total)
        .await?;
    state.poller.start(&order_id);

    cart.clear().await;
    info!(
        order_id = %order_id,
        order_code = %order_code,
        store = %session.store_code,
        table = %session.table_number,
        "Checkout complete"
    );

    Ok(Json(CheckoutResponse {
        order_id,
        order_code,
        payment,
        order: session.cart_do_order,
    }))
}

/// Saves a payment snapshot and submits it upstream. A snapshot already
/// submitted for this exact cart is reused, so retrying after a failed
/// charge does not place the order twice.
async fn submit_or_resume(
    state: &SharedState,
    user: &UserSession,
    items: Vec<LineItem>,
) -> ApiResult<(PaymentSession, String)> {
    if let Some(saved) = state.payment_sessions.get().await? {
        if let Some(code) = saved.submitted_order_for(user, &items) {
            let code = code.to_string();
            info!(order_id = %saved.order_id, order_code = %code, "Resuming submitted order");
            return Ok((saved, code));
        }
    }

    let payload = normalize_order(&items, None);
    let minimum = state.config.payment.minimum_amount;
    if payload.grand_total.amount() < minimum {
        return Err(GatewayError::AmountTooSmall {
            amount: payload.grand_total.amount(),
            minimum,
        }
        .into());
    }

    let order_id = new_order_id();
    let session = PaymentSession::capture(user, items, payload, order_id.as_str());
    state.payment_sessions.save(&session).await?;
    debug!(order_id = %order_id, total = %session.payment_total, "Payment session saved");

    let order_code = state
        .upstream
        .submit_order(&OrderSubmission::from_session(&session))
        .await?;
    state.payment_sessions.set_order_code(&order_code).await?;
    Ok((session, order_code))
}
