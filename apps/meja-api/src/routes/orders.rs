//! Order status: the upstream's copy of an order, priced the way the
//! order status screen shows it.

use axum::extract::{Path, Query, State};
use axum::Json;
use meja_core::boundary::order_amount;
use meja_core::validation::validate_store_code;
use meja_core::{
    aggregate_for, parse_order_lines, CartTotals, CoreError, LineItem, Money, OrderProgress,
    PricingView,
};
use meja_gateway::upstream::order_progress;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_code: String,
    pub store: String,
    pub progress: Option<OrderProgress>,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    /// Grand total as the upstream stated it.
    pub reported_total: Option<Money>,
}

pub async fn show(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<OrderView>> {
    let store = match query.store {
        Some(store) => store,
        None => resolve_store(&state).await?,
    };
    validate_store_code(&store)?;

    let echo = state.upstream.fetch_order(&store, &code).await?;
    let items = parse_order_lines(&echo);
    let totals = aggregate_for(&items, PricingView::OrderStatus);
    let reported_total = order_amount(&echo);

    if let Some(reported) = reported_total {
        if reported != totals.grand_total {
            warn!(
                order_code = %code,
                reported = %reported,
                computed = %totals.grand_total,
                "Upstream total differs from computed total"
            );
        }
    }
    debug!(order_code = %code, items = items.len(), "Order fetched");

    Ok(Json(OrderView {
        order_code: code,
        store,
        progress: order_progress(&echo),
        items,
        totals,
        reported_total,
    }))
}

/// Store of the last checkout, else the store of the table session.
async fn resolve_store(state: &SharedState) -> ApiResult<String> {
    if let Some(payment) = state.payment_sessions.get().await? {
        return Ok(payment.store_code);
    }
    let user = state.sessions.get().await?.ok_or(CoreError::NoSession)?;
    Ok(user.store_location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::{config_for, offline_state, spawn_mock_backend, state_for};
    use meja_core::UserSession;

    #[tokio::test]
    async fn test_show_prices_echo() {
        let state = state_for(config_for(&spawn_mock_backend().await)).await;
        state
            .sessions
            .save(&UserSession::dine_in("JKT-01", "7"))
            .await
            .unwrap();

        let Json(view) = show(State(state), Path("A-17".into()), Query(OrderQuery::default()))
            .await
            .unwrap();
        assert_eq!(view.store, "JKT-01");
        assert_eq!(view.progress, Some(OrderProgress::AwaitingPayment));
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity(), 2);
        assert_eq!(view.totals.subtotal, Money::new(36_000));
        assert_eq!(view.totals.grand_total, Money::new(39_600));
        assert_eq!(view.reported_total, Some(Money::new(39_600)));
    }

    #[tokio::test]
    async fn test_explicit_store_needs_no_session() {
        let state = state_for(config_for(&spawn_mock_backend().await)).await;
        let query = OrderQuery { store: Some("BDG-02".into()) };

        let Json(view) = show(State(state), Path("A-17".into()), Query(query)).await.unwrap();
        assert_eq!(view.store, "BDG-02");
        assert_eq!(view.order_code, "A-17");
    }

    #[tokio::test]
    async fn test_no_store_known() {
        let state = offline_state().await;
        let result = show(State(state), Path("A-17".into()), Query(OrderQuery::default())).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let state = offline_state().await;
        let query = OrderQuery { store: Some("JKT-01".into()) };
        let result = show(State(state), Path("A-17".into()), Query(query)).await;
        assert!(matches!(result, Err(ApiError::BadGateway(_))));
    }
}
