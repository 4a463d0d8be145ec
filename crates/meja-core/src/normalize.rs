//! # Order Payload Normalizer
//!
//! Builds the "do-order" body the upstream order API consumes from the cart.
//!
//! ## Emission Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  menus[]                                                                │
//! │    qty        = the menu line's own quantity                            │
//! │    condiments = always qty 1, priced and taxed once                     │
//! │                                                                         │
//! │  combos[]                                                               │
//! │    product qty = block qty × combo qty   (product's own qty ignored)    │
//! │    condiments  = always qty 1, priced and taxed once                    │
//! │                                                                         │
//! │  taxAmount   = round(price × emitted qty × percentage / 100)            │
//! │                precomputed amounts are discarded                        │
//! │                                                                         │
//! │  subTotal    = Σ emitted bases                                          │
//! │  taxes       = one PB1 (10) / PPN (11) summary per non-zero bucket      │
//! │  rounding    = gross − computed, or the checkout nearest-100 rule       │
//! │  grandTotal  = subTotal + taxes + rounding                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The display calculator honours precomputed tax amounts and this builder
//! does not, so the two can disagree by a few Rupiah. The upstream computes
//! the authoritative figure from this payload.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::PricingView;
use crate::money::Money;
use crate::tax::{TaxBuckets, TaxCategory};
use crate::types::{ComboLine, Condiment, LineItem, MenuLine, TaxRate};

/// Quantity emitted for every condiment.
pub const EMITTED_CONDIMENT_QUANTITY: i64 = 1;

// =============================================================================
// Payload Types
// =============================================================================

/// One tax on an emitted product or condiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxEntry {
    pub tax_name: String,
    pub tax_percentage: f64,
    pub tax_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CondimentEntry {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub qty: i64,
    pub taxes: Vec<TaxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub qty: i64,
    pub note: String,
    pub condiments: Vec<CondimentEntry>,
    pub taxes: Vec<TaxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboProductEntry {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub qty: i64,
    pub condiments: Vec<CondimentEntry>,
    pub taxes: Vec<TaxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboEntry {
    pub code: String,
    pub name: String,
    pub qty: i64,
    pub note: String,
    pub products: Vec<ComboProductEntry>,
}

/// Aggregate tax line of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub tax_name: String,
    pub tax_percentage: f64,
    pub tax_amount: Money,
}

/// The normalised order body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub menus: Vec<MenuEntry>,
    pub combos: Vec<ComboEntry>,
    pub sub_total: Money,
    pub taxes: Vec<TaxSummary>,
    pub rounding: Money,
    pub grand_total: Money,
}

impl OrderPayload {
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty() && self.combos.is_empty()
    }

    /// Sum of the tax summary lines.
    pub fn tax_total(&self) -> Money {
        self.taxes.iter().map(|t| t.tax_amount).sum()
    }
}

// =============================================================================
// Normalisation
// =============================================================================

/// Builds the order payload for `items`.
///
/// `gross_amount`, when known (for example the amount already charged), pins
/// the grand total and the rounding becomes the difference to it.
pub fn normalize_order(items: &[LineItem], gross_amount: Option<Money>) -> OrderPayload {
    if items.is_empty() {
        return OrderPayload::default();
    }

    let mut payload = OrderPayload::default();
    let mut buckets = TaxBuckets::default();

    for item in items {
        match item {
            LineItem::Menu(menu) => {
                payload
                    .menus
                    .push(emit_menu(menu, &mut payload.sub_total, &mut buckets));
            }
            LineItem::Combo(combo) => {
                payload
                    .combos
                    .push(emit_combo(combo, &mut payload.sub_total, &mut buckets));
            }
        }
    }

    for category in [TaxCategory::Service, TaxCategory::ValueAdded] {
        let amount = buckets.get(category);
        if !amount.is_zero() {
            payload.taxes.push(TaxSummary {
                tax_name: category.summary_name().to_string(),
                tax_percentage: category.summary_percentage(),
                tax_amount: amount,
            });
        }
    }

    let computed = payload.sub_total + buckets.total();
    payload.rounding = match gross_amount {
        Some(gross) => gross - computed,
        None => PricingView::Checkout
            .policy()
            .rounding_for(payload.sub_total, computed),
    };
    payload.grand_total = computed + payload.rounding;
    payload
}

fn emit_menu(menu: &MenuLine, sub_total: &mut Money, buckets: &mut TaxBuckets) -> MenuEntry {
    let price = menu.own_unit_price();
    let qty = menu.quantity;
    *sub_total += price * qty;

    MenuEntry {
        code: menu.code.clone(),
        name: menu.name.clone(),
        price,
        qty,
        note: menu.note.clone(),
        condiments: emit_condiments(&menu.condiments, sub_total, buckets),
        taxes: emit_taxes(&menu.taxes, price, qty, buckets),
    }
}

fn emit_combo(combo: &ComboLine, sub_total: &mut Money, buckets: &mut TaxBuckets) -> ComboEntry {
    let mut products = Vec::new();

    for block in &combo.blocks {
        let qty = block.quantity.saturating_mul(combo.quantity);
        for product in &block.products {
            *sub_total += product.unit_price * qty;
            products.push(ComboProductEntry {
                code: product.code.clone(),
                name: product.name.clone(),
                price: product.unit_price,
                qty,
                condiments: emit_condiments(&product.condiments, sub_total, buckets),
                taxes: emit_taxes(&product.taxes, product.unit_price, qty, buckets),
            });
        }
    }

    ComboEntry {
        code: combo.code.clone(),
        name: combo.name.clone(),
        qty: combo.quantity,
        note: combo.note.clone(),
        products,
    }
}

fn emit_condiments(
    condiments: &[Condiment],
    sub_total: &mut Money,
    buckets: &mut TaxBuckets,
) -> Vec<CondimentEntry> {
    condiments
        .iter()
        .map(|condiment| {
            *sub_total += condiment.unit_price * EMITTED_CONDIMENT_QUANTITY;
            CondimentEntry {
                code: condiment.code.clone(),
                name: condiment.name.clone(),
                price: condiment.unit_price,
                qty: EMITTED_CONDIMENT_QUANTITY,
                taxes: emit_taxes(
                    &condiment.taxes,
                    condiment.unit_price,
                    EMITTED_CONDIMENT_QUANTITY,
                    buckets,
                ),
            }
        })
        .collect()
}

fn emit_taxes(
    taxes: &[TaxRate],
    price: Money,
    units: i64,
    buckets: &mut TaxBuckets,
) -> Vec<TaxEntry> {
    taxes
        .iter()
        .map(|tax| {
            let amount = (price * units).percent(tax.percentage);
            buckets.add_named(&tax.category_name, amount);
            TaxEntry {
                tax_name: tax.category_name.clone(),
                tax_percentage: tax.percentage,
                tax_amount: amount,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
