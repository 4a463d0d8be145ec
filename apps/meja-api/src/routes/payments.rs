//! Payment status, gateway webhook and cancellation.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use meja_core::PaymentStatus;
use meja_gateway::{PaymentNotification, TransactionState};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusView {
    pub order_id: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl From<TransactionState> for PaymentStatusView {
    fn from(state: TransactionState) -> Self {
        PaymentStatusView {
            order_id: state.order_id,
            status: state.status,
            transaction_status: Some(state.transaction_status),
            checked_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAck {
    pub order_id: String,
    pub status: PaymentStatus,
}

/// Status of `order_id`. A watched order answers from the poller once it
/// has checked at least once; anything else asks the gateway.
pub async fn status(
    State(state): State<SharedState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<PaymentStatusView>> {
    if let Some(update) = state.poller.latest(&order_id).filter(|u| u.attempts > 0) {
        debug!(order_id = %order_id, attempts = update.attempts, "Status from poller");
        return Ok(Json(PaymentStatusView {
            order_id: update.order_id,
            status: update.status,
            transaction_status: None,
            checked_at: update.checked_at,
        }));
    }

    let transaction = state.payments.status(&order_id).await?;
    Ok(Json(transaction.into()))
}

/// Gateway webhook. Only signed notifications are accepted.
pub async fn notify(
    State(state): State<SharedState>,
    Json(notification): Json<PaymentNotification>,
) -> ApiResult<Json<NotificationAck>> {
    let status = state.payments.verify_notification(&notification)?;
    info!(
        order_id = %notification.order_id,
        transaction_status = %notification.transaction_status,
        ?status,
        "Payment notification received"
    );

    let watched = state.poller.watched_order();
    if status.is_terminal() && watched.as_deref() == Some(notification.order_id.as_str()) {
        state.poller.cancel();
    }

    Ok(Json(NotificationAck {
        order_id: notification.order_id,
        status,
    }))
}

pub async fn cancel(
    State(state): State<SharedState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<PaymentStatusView>> {
    let transaction = state.payments.cancel(&order_id).await?;
    if state.poller.watched_order().as_deref() == Some(order_id.as_str()) {
        state.poller.cancel();
    }
    Ok(Json(transaction.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::{config_for, offline_state, spawn_mock_backend, state_for, SERVER_KEY};
    use meja_gateway::signature_key;

    fn notification(order_id: &str, transaction_status: &str, key: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: order_id.to_string(),
            status_code: "200".into(),
            gross_amount: "39600.00".into(),
            signature_key: signature_key(order_id, "200", "39600.00", key),
            transaction_status: transaction_status.into(),
            transaction_id: Some("trx-1".into()),
            fraud_status: None,
        }
    }

    #[tokio::test]
    async fn test_status_asks_gateway() {
        let state = state_for(config_for(&spawn_mock_backend().await)).await;
        let Json(view) = status(State(state), Path("MEJA-1".into())).await.unwrap();
        assert_eq!(view.order_id, "MEJA-1");
        assert_eq!(view.status, PaymentStatus::Paid);
        assert_eq!(view.transaction_status.as_deref(), Some("settlement"));
    }

    #[tokio::test]
    async fn test_status_unreachable_gateway() {
        let state = offline_state().await;
        let result = status(State(state), Path("MEJA-1".into())).await;
        assert!(matches!(result, Err(ApiError::BadGateway(_))));
    }

    #[tokio::test]
    async fn test_notify_verifies_signature() {
        let state = offline_state().await;

        let Json(ack) = notify(State(state.clone()), Json(notification("MEJA-1", "settlement", SERVER_KEY)))
            .await
            .unwrap();
        assert_eq!(ack.order_id, "MEJA-1");
        assert_eq!(ack.status, PaymentStatus::Paid);

        let forged = notification("MEJA-1", "settlement", "someone-else");
        let result = notify(State(state), Json(forged)).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_cancel_stops_watch() {
        let state = state_for(config_for(&spawn_mock_backend().await)).await;
        state.poller.start("MEJA-1");

        let Json(view) = cancel(State(state.clone()), Path("MEJA-1".into())).await.unwrap();
        assert_eq!(view.status, PaymentStatus::Failed);
        assert_eq!(state.poller.watched_order(), None);
    }

    #[tokio::test]
    async fn test_cancel_leaves_other_watch() {
        let state = state_for(config_for(&spawn_mock_backend().await)).await;
        state.poller.start("MEJA-2");

        cancel(State(state.clone()), Path("MEJA-1".into())).await.unwrap();
        assert_eq!(state.poller.watched_order().as_deref(), Some("MEJA-2"));
        state.poller.cancel();
    }
}
