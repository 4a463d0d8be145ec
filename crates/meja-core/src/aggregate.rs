//! # Cart Aggregator
//!
//! Sums line items into the totals shown on the checkout, order-status and
//! bill screens.
//!
//! ## Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal + service tax + value-added tax = grand total before rounding │
//! │                                                                         │
//! │  subtotal < threshold  OR  before < threshold ?                         │
//! │        │ yes                         │ no                               │
//! │        ▼                             ▼                                  │
//! │  rounding = 0                 round to nearest 100 (half up)            │
//! │                               rounding = rounded − before (signed)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The threshold is a per-view constant. Checkout waives rounding below 50,
//! order status and bill below 20.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::calculator::calculate_line;
use crate::error::CoreError;
use crate::money::Money;
use crate::types::LineItem;
use crate::ROUNDING_UNIT;

/// Rounding threshold used by the checkout screen.
pub const CHECKOUT_ROUNDING_THRESHOLD: i64 = 50;

/// Rounding threshold used by the order-status screen.
pub const ORDER_STATUS_ROUNDING_THRESHOLD: i64 = 20;

/// Rounding threshold used by the bill screen.
pub const BILL_ROUNDING_THRESHOLD: i64 = 20;

// =============================================================================
// Rounding Policy
// =============================================================================

/// When and how a grand total is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundingPolicy {
    /// Totals below this amount are not rounded.
    pub threshold: Money,
    /// Totals are rounded to a multiple of this.
    pub unit: i64,
}

impl RoundingPolicy {
    pub const fn new(threshold: i64) -> Self {
        RoundingPolicy {
            threshold: Money::new(threshold),
            unit: ROUNDING_UNIT,
        }
    }

    /// Returns the signed rounding adjustment for `before`.
    ///
    /// ```rust
    /// use meja_core::aggregate::RoundingPolicy;
    /// use meja_core::money::Money;
    ///
    /// let policy = RoundingPolicy::new(50);
    /// assert_eq!(policy.rounding_for(Money::new(1_000), Money::new(1_120)).amount(), -20);
    /// assert_eq!(policy.rounding_for(Money::new(49), Money::new(60)).amount(), 0);
    /// ```
    pub fn rounding_for(&self, subtotal: Money, before: Money) -> Money {
        if subtotal < self.threshold || before < self.threshold {
            return Money::zero();
        }
        before.round_to_nearest(self.unit) - before
    }
}

// =============================================================================
// Pricing View
// =============================================================================

/// The screens that display cart totals, each with its own rounding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PricingView {
    Checkout,
    OrderStatus,
    Bill,
}

impl PricingView {
    pub fn policy(&self) -> RoundingPolicy {
        match self {
            PricingView::Checkout => RoundingPolicy::new(CHECKOUT_ROUNDING_THRESHOLD),
            PricingView::OrderStatus => RoundingPolicy::new(ORDER_STATUS_ROUNDING_THRESHOLD),
            PricingView::Bill => RoundingPolicy::new(BILL_ROUNDING_THRESHOLD),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingView::Checkout => "checkout",
            PricingView::OrderStatus => "order-status",
            PricingView::Bill => "bill",
        }
    }
}

impl fmt::Display for PricingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingView {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(PricingView::Checkout),
            "order-status" | "order_status" => Ok(PricingView::OrderStatus),
            "bill" => Ok(PricingView::Bill),
            other => Err(CoreError::UnknownPricingView(other.to_string())),
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Totals for a list of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    pub service_tax: Money,
    pub value_added_tax: Money,
    pub grand_total_before_rounding: Money,
    /// Signed adjustment; may be negative.
    pub rounding: Money,
    pub grand_total: Money,
}

impl CartTotals {
    pub fn tax_total(&self) -> Money {
        self.service_tax + self.value_added_tax
    }
}

/// Sums `items` and applies `policy`.
pub fn aggregate(items: &[LineItem], policy: RoundingPolicy) -> CartTotals {
    let mut totals = CartTotals::default();

    for item in items {
        let line = calculate_line(item);
        totals.subtotal += line.base;
        totals.service_tax += line.service_tax;
        totals.value_added_tax += line.value_added_tax;
    }

    totals.grand_total_before_rounding =
        totals.subtotal + totals.service_tax + totals.value_added_tax;
    totals.rounding = policy.rounding_for(totals.subtotal, totals.grand_total_before_rounding);
    totals.grand_total = totals.grand_total_before_rounding + totals.rounding;
    totals
}

/// Sums `items` with the policy of `view`.
pub fn aggregate_for(items: &[LineItem], view: PricingView) -> CartTotals {
    aggregate(items, view.policy())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComboBlock, ComboLine, ComboProduct, MenuLine, TaxRate};

    fn plain(price: i64) -> LineItem {
        MenuLine::new("X", "Kerupuk", Money::new(price)).into()
    }

    #[test]
    fn test_menu_end_to_end_totals() {
        let items = vec![MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_quantity(2)
            .with_tax(TaxRate::new("PB1", 10.0))
            .into()];

        let totals = aggregate_for(&items, PricingView::Checkout);
        assert_eq!(totals.subtotal, Money::new(36_000));
        assert_eq!(totals.service_tax, Money::new(3_600));
        assert_eq!(totals.value_added_tax, Money::zero());
        assert_eq!(totals.grand_total_before_rounding, Money::new(39_600));
        assert_eq!(totals.rounding, Money::zero());
        assert_eq!(totals.grand_total, Money::new(39_600));
    }

    #[test]
    fn test_combo_end_to_end_totals() {
        let items = vec![ComboLine::new("CB1", "Paket Berdua")
            .with_block(
                ComboBlock::new(1)
                    .with_product(
                        ComboProduct::new("P1", "Ayam", Money::new(10_000))
                            .with_tax(TaxRate::new("PPN", 11.0)),
                    )
                    .with_product(ComboProduct::new("P2", "Es Teh", Money::new(10_000))),
            )
            .into()];

        let totals = aggregate_for(&items, PricingView::Bill);
        assert_eq!(totals.subtotal, Money::new(20_000));
        assert_eq!(totals.value_added_tax, Money::new(1_100));
        assert_eq!(totals.grand_total_before_rounding, Money::new(21_100));
        assert_eq!(totals.rounding, Money::zero());
        assert_eq!(totals.grand_total, Money::new(21_100));
    }

    #[test]
    fn test_checkout_threshold_boundary() {
        let below = aggregate_for(&[plain(49)], PricingView::Checkout);
        assert_eq!(below.rounding, Money::zero());
        assert_eq!(below.grand_total, Money::new(49));

        // 50 rounds up to 100.
        let at = aggregate_for(&[plain(50)], PricingView::Checkout);
        assert_eq!(at.rounding, Money::new(50));
        assert_eq!(at.grand_total, Money::new(100));
    }

    #[test]
    fn test_order_status_and_bill_threshold_boundary() {
        for view in [PricingView::OrderStatus, PricingView::Bill] {
            let below = aggregate_for(&[plain(19)], view);
            assert_eq!(below.rounding, Money::zero(), "{view}");

            // 20 rounds down to 0.
            let at = aggregate_for(&[plain(20)], view);
            assert_eq!(at.rounding, Money::new(-20), "{view}");
            assert_eq!(at.grand_total, Money::zero(), "{view}");
        }
    }

    #[test]
    fn test_same_cart_differs_only_below_fifty() {
        let items = [plain(30)];
        assert_eq!(aggregate_for(&items, PricingView::Checkout).rounding, Money::zero());
        assert_eq!(aggregate_for(&items, PricingView::Bill).rounding, Money::new(-30));
    }

    #[test]
    fn test_rounding_is_signed() {
        let up = aggregate_for(&[plain(21_150)], PricingView::Checkout);
        assert_eq!(up.rounding, Money::new(50));

        let down = aggregate_for(&[plain(21_120)], PricingView::Checkout);
        assert_eq!(down.rounding, Money::new(-20));
        assert_eq!(down.grand_total, Money::new(21_100));
    }

    #[test]
    fn test_aggregate_is_pure() {
        let items = vec![plain(12_345), plain(6_789)];
        let first = aggregate_for(&items, PricingView::Checkout);
        let second = aggregate_for(&items, PricingView::Checkout);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(aggregate_for(&[], PricingView::Checkout), CartTotals::default());
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!("checkout".parse::<PricingView>().unwrap(), PricingView::Checkout);
        assert_eq!("order-status".parse::<PricingView>().unwrap(), PricingView::OrderStatus);
        assert_eq!("bill".parse::<PricingView>().unwrap(), PricingView::Bill);
        assert!("receipt".parse::<PricingView>().is_err());
    }
}
