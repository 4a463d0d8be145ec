//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cart_items: usize,
    pub payments_configured: bool,
    pub qr_configured: bool,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cart_items = state.cart.lock().await.len();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cart_items,
        payments_configured: state.config.payment.is_configured(),
        qr_configured: state.qr.is_some(),
    })
}
