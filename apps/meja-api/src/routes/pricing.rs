//! Stateless pricing: totals for an arbitrary list of items under one of
//! the display views.

use axum::extract::Path;
use axum::Json;
use meja_core::{aggregate_for, calculate_line, parse_order_lines, CartTotals, LineAmounts, PricingView};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    #[serde(flatten)]
    pub amounts: LineAmounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub view: PricingView,
    pub lines: Vec<PricedLine>,
    pub totals: CartTotals,
}

/// Prices `body` (a list of cart entries or an order echo) for `view`.
/// Entries that cannot be read are left out.
pub async fn price(Path(view): Path<String>, Json(body): Json<Value>) -> ApiResult<Json<PricingResponse>> {
    let view: PricingView = view.parse()?;
    let items = parse_order_lines(&body);

    let lines = items
        .iter()
        .map(|item| PricedLine {
            code: item.code().to_string(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            amounts: calculate_line(item),
        })
        .collect();

    Ok(Json(PricingResponse {
        view,
        lines,
        totals: aggregate_for(&items, view),
    }))
}
