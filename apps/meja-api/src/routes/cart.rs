//! Cart endpoints. Every response is the whole cart with its checkout
//! totals.

use axum::extract::{Path, State};
use axum::Json;
use meja_core::validation::{validate_cart_size, validate_note, validate_quantity};
use meja_core::{aggregate_for, parse_line_item, CartTotals, CoreError, LineItem, PricingView};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl CartView {
    pub fn of(items: &[LineItem]) -> Self {
        CartView {
            items: items.to_vec(),
            totals: aggregate_for(items, PricingView::Checkout),
        }
    }
}

pub async fn list(State(state): State<SharedState>) -> Json<CartView> {
    let cart = state.cart.lock().await;
    Json(CartView::of(cart.list()))
}

/// Adds an item, merging with an identical configuration.
pub async fn append(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<CartView>> {
    let item = read_item(&body)?;
    let mut cart = state.cart.lock().await;

    let signature = item.signature();
    match cart.list().iter().find(|existing| existing.signature() == signature) {
        Some(existing) => {
            validate_quantity(existing.quantity().saturating_add(item.quantity()))?;
        }
        None => validate_cart_size(cart.len())?,
    }

    Ok(Json(CartView::of(cart.append(item).await)))
}

/// Replaces the item at `index` with the edited configuration.
pub async fn replace(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(body): Json<Value>,
) -> ApiResult<Json<CartView>> {
    let item = read_item(&body)?;
    let mut cart = state.cart.lock().await;
    ensure_index(index, cart.len())?;

    Ok(Json(CartView::of(cart.replace_at(index, item).await)))
}

pub async fn remove(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<CartView>> {
    let mut cart = state.cart.lock().await;
    ensure_index(index, cart.len())?;

    Ok(Json(CartView::of(cart.remove_at(index).await)))
}

pub async fn clear(State(state): State<SharedState>) -> Json<CartView> {
    let mut cart = state.cart.lock().await;
    Json(CartView::of(cart.clear().await))
}

fn read_item(body: &Value) -> ApiResult<LineItem> {
    let item = parse_line_item(body)
        .ok_or_else(|| CoreError::InvalidLineItem("expected a menu or combo object".into()))?;

    validate_quantity(item.quantity())?;
    validate_note(item.note())?;
    debug!(code = %item.code(), quantity = item.quantity(), "Cart item accepted");
    Ok(item)
}

fn ensure_index(index: usize, len: usize) -> Result<(), CoreError> {
    if index >= len {
        return Err(CoreError::IndexOutOfRange { index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::{es_teh, nasi_goreng, offline_state};
    use meja_core::Money;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_merges_and_prices() {
        let state = offline_state().await;
        append(State(state.clone()), Json(nasi_goreng(1))).await.unwrap();
        let Json(view) = append(State(state.clone()), Json(nasi_goreng(1))).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity(), 2);
        assert_eq!(view.totals.subtotal, Money::new(36_000));
        assert_eq!(view.totals.service_tax, Money::new(3_600));
        assert_eq!(view.totals.grand_total, Money::new(39_600));
        assert_eq!(view.totals.rounding, Money::zero());

        let Json(listed) = list(State(state)).await;
        assert_eq!(listed, view);
    }

    #[tokio::test]
    async fn test_merge_past_limit_rejected() {
        let state = offline_state().await;
        append(State(state.clone()), Json(nasi_goreng(60))).await.unwrap();

        let result = append(State(state.clone()), Json(nasi_goreng(60))).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));

        let cart = state.cart.lock().await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.list()[0].quantity(), 60);
    }

    #[tokio::test]
    async fn test_replace_sets_exact_quantity() {
        let state = offline_state().await;
        append(State(state.clone()), Json(nasi_goreng(2))).await.unwrap();
        append(State(state.clone()), Json(es_teh())).await.unwrap();

        let Json(view) = replace(State(state.clone()), Path(0), Json(nasi_goreng(5)))
            .await
            .unwrap();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].quantity(), 5);
        assert_eq!(view.items[1].code(), "ET01");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let state = offline_state().await;
        append(State(state.clone()), Json(nasi_goreng(1))).await.unwrap();
        append(State(state.clone()), Json(es_teh())).await.unwrap();

        let Json(view) = remove(State(state.clone()), Path(0)).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].code(), "ET01");

        let Json(view) = clear(State(state)).await;
        assert!(view.items.is_empty());
        assert_eq!(view.totals.grand_total, Money::zero());
    }

    #[tokio::test]
    async fn test_out_of_range_is_not_found() {
        let state = offline_state().await;
        append(State(state.clone()), Json(nasi_goreng(1))).await.unwrap();

        let result = remove(State(state.clone()), Path(3)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let result = replace(State(state.clone()), Path(1), Json(es_teh())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(state.cart.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_bodies_rejected() {
        let state = offline_state().await;

        let result = append(State(state.clone()), Json(json!("nasi goreng"))).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));

        let result = append(State(state.clone()), Json(nasi_goreng(500))).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));

        let mut noted = es_teh();
        noted["note"] = json!("x".repeat(300));
        let result = append(State(state.clone()), Json(noted)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));

        assert!(state.cart.lock().await.is_empty());
    }
}
