//! Table session: who is ordering, established by scanning the QR code.

use axum::extract::State;
use axum::Json;
use meja_core::{CoreError, UserSession};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrScanRequest {
    pub token: String,
}

/// Current session.
pub async fn current(State(state): State<SharedState>) -> ApiResult<Json<UserSession>> {
    let session = state.sessions.get().await?.ok_or(CoreError::NoSession)?;
    Ok(Json(session))
}

/// Verifies a scanned table token and starts a dine-in session.
///
/// Moving to another store empties the cart: its items belong to the
/// previous store's menu.
pub async fn scan_qr(
    State(state): State<SharedState>,
    Json(request): Json<QrScanRequest>,
) -> ApiResult<Json<UserSession>> {
    let verifier = state
        .qr
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("QR verification is not configured".into()))?;
    let session = verifier.verify(&request.token)?;

    let previous = state.sessions.get().await?;
    let store_changed = previous
        .as_ref()
        .is_some_and(|p| p.store_location != session.store_location);
    if store_changed {
        info!(store = %session.store_location, "Store changed, clearing cart");
        state.cart.lock().await.clear().await;
    }

    state.sessions.save(&session).await?;
    info!(
        store = %session.store_location,
        table = %session.table_number,
        "Table session started"
    );
    Ok(Json(session))
}
