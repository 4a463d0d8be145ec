//! # Line-Item Tax Calculator
//!
//! Computes the base amount and the two tax buckets for one cart entry.
//! The same function serves the local cart and the upstream's echoed order,
//! so every screen shows the same numbers.
//!
//! ## Menu Item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Nasi Goreng ×2   unit 18.000   condiment Telur ×1 @ 4.000              │
//! │                                                                         │
//! │  unit base       = reported price × qty          = 18.000 × 2 = 36.000  │
//! │  condiment base  = 4.000 × 1                                  =  4.000  │
//! │  line base       = 40.000                                               │
//! │                                                                         │
//! │  item tax PB1 10%       → round(40.000 × 10%)    =  4.000  (service)    │
//! │  condiment tax PB1 10%  → round( 4.000 × 10%)    =    400  (service)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A condiment's quantity is the absolute count for the whole line, so its
//! base is not multiplied by the item quantity. When the reported price
//! already has the condiments folded in (reported == unit + condiments), the
//! line base is reported price × qty and condiment bases are not added again.
//! Item percentage taxes apply to the whole line base.
//!
//! ## Combo Item
//! Every product line is scaled by `product qty × block qty × combo qty`;
//! condiments under a product additionally by their own quantity.
//!
//! ## Tax Amounts
//! A non-zero precomputed per-unit amount wins and is scaled by the same
//! multipliers as the base. Otherwise the percentage is applied to the line
//! base. Each contribution is rounded as it enters its bucket; names matching
//! neither PB nor PPN are dropped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tax::TaxBuckets;
use crate::types::{ComboLine, LineItem, MenuLine, TaxRate};

/// Base and taxes of one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub base: Money,
    pub service_tax: Money,
    pub value_added_tax: Money,
}

impl LineAmounts {
    pub fn tax_total(&self) -> Money {
        self.service_tax + self.value_added_tax
    }

    /// Base plus both taxes.
    pub fn total(&self) -> Money {
        self.base + self.tax_total()
    }

    fn from_parts(base: Money, buckets: TaxBuckets) -> Self {
        LineAmounts {
            base,
            service_tax: buckets.service_tax,
            value_added_tax: buckets.value_added_tax,
        }
    }
}

/// Calculates base and taxes for one line item.
pub fn calculate_line(item: &LineItem) -> LineAmounts {
    match item {
        LineItem::Menu(menu) => calculate_menu(menu),
        LineItem::Combo(combo) => calculate_combo(combo),
    }
}

fn calculate_menu(menu: &MenuLine) -> LineAmounts {
    let quantity = menu.quantity;
    let unit_base = menu.reported_price.unwrap_or(menu.unit_price);
    let mut line_base = unit_base * quantity;
    if !menu.condiments_folded() {
        line_base += menu.condiment_unit_total();
    }

    let mut buckets = TaxBuckets::default();
    apply_taxes(&mut buckets, &menu.taxes, line_base, quantity);
    for condiment in &menu.condiments {
        let cond_base = condiment.unit_price * condiment.quantity;
        apply_taxes(
            &mut buckets,
            &condiment.taxes,
            cond_base,
            condiment.quantity.saturating_mul(quantity),
        );
    }

    LineAmounts::from_parts(line_base, buckets)
}

fn calculate_combo(combo: &ComboLine) -> LineAmounts {
    let mut base = Money::zero();
    let mut buckets = TaxBuckets::default();

    for block in &combo.blocks {
        for product in &block.products {
            let multiplier = product
                .quantity
                .saturating_mul(block.quantity)
                .saturating_mul(combo.quantity);
            let product_base = product.unit_price * multiplier;

            base += product_base;
            apply_taxes(&mut buckets, &product.taxes, product_base, multiplier);

            for condiment in &product.condiments {
                let units = condiment.quantity.saturating_mul(multiplier);
                let cond_base = condiment.unit_price * units;
                base += cond_base;
                apply_taxes(&mut buckets, &condiment.taxes, cond_base, units);
            }
        }
    }

    LineAmounts::from_parts(base, buckets)
}

fn apply_taxes(buckets: &mut TaxBuckets, taxes: &[TaxRate], line_base: Money, units: i64) {
    for tax in taxes {
        let amount = match tax.authoritative_amount() {
            Some(per_unit) => Money::round_from(per_unit * units as f64),
            None => line_base.percent(tax.percentage),
        };
        buckets.add_named(&tax.category_name, amount);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComboBlock, ComboProduct, Condiment};

    fn pb1() -> TaxRate {
        TaxRate::new("PB1", 10.0)
    }

    #[test]
    fn test_menu_end_to_end() {
        let item: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_quantity(2)
            .with_tax(pb1())
            .into();

        let amounts = calculate_line(&item);
        assert_eq!(amounts.base, Money::new(36_000));
        assert_eq!(amounts.service_tax, Money::new(3_600));
        assert_eq!(amounts.value_added_tax, Money::zero());
        assert_eq!(amounts.total(), Money::new(39_600));
    }

    #[test]
    fn test_combo_end_to_end() {
        let item: LineItem = ComboLine::new("CB1", "Paket Berdua")
            .with_block(
                ComboBlock::new(1)
                    .with_product(
                        ComboProduct::new("P1", "Ayam", Money::new(10_000))
                            .with_tax(TaxRate::new("PPN", 11.0)),
                    )
                    .with_product(ComboProduct::new("P2", "Es Teh", Money::new(10_000))),
            )
            .into();

        let amounts = calculate_line(&item);
        assert_eq!(amounts.base, Money::new(20_000));
        assert_eq!(amounts.value_added_tax, Money::new(1_100));
        assert_eq!(amounts.service_tax, Money::zero());
        assert_eq!(amounts.total(), Money::new(21_100));
    }

    #[test]
    fn test_condiments_not_double_counted_when_folded() {
        let egg = Condiment::new("EGG", "Telur", Money::new(4_000));

        // Upstream echo: reported price already includes the condiment.
        let folded: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_reported_price(Money::new(22_000))
            .with_condiment(egg.clone())
            .into();
        assert_eq!(calculate_line(&folded).base, Money::new(22_000));

        // Local cart: reported price is the bare product price.
        let bare: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_reported_price(Money::new(18_000))
            .with_condiment(egg)
            .into();
        assert_eq!(calculate_line(&bare).base, Money::new(22_000));
    }

    #[test]
    fn test_item_tax_covers_unfolded_condiments() {
        let egg = Condiment::new("EGG", "Telur", Money::new(4_000));

        let bare: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_tax(pb1())
            .with_condiment(egg.clone())
            .into();
        let amounts = calculate_line(&bare);
        assert_eq!(amounts.base, Money::new(22_000));
        assert_eq!(amounts.service_tax, Money::new(2_200));

        // Same order echoed with the condiment folded into the price.
        let folded: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_reported_price(Money::new(22_000))
            .with_tax(pb1())
            .with_condiment(egg)
            .into();
        assert_eq!(calculate_line(&folded), amounts);
    }

    #[test]
    fn test_condiment_base_not_scaled_by_item_quantity() {
        let item: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_quantity(3)
            .with_condiment(
                Condiment::new("EGG", "Telur", Money::new(4_000))
                    .with_quantity(2)
                    .with_tax(pb1()),
            )
            .into();

        let amounts = calculate_line(&item);
        // 18.000 × 3 + 4.000 × 2
        assert_eq!(amounts.base, Money::new(62_000));
        // tax only on the condiment: 8.000 × 10%
        assert_eq!(amounts.service_tax, Money::new(800));
    }

    #[test]
    fn test_extreme_multipliers_do_not_panic() {
        let item: LineItem = ComboLine::new("CB1", "Paket")
            .with_quantity(i64::MAX)
            .with_block(
                ComboBlock::new(i64::MAX).with_product(
                    ComboProduct::new("P1", "Ayam", Money::new(i64::MAX))
                        .with_quantity(i64::MAX)
                        .with_tax(TaxRate::new("PB1", 10.0))
                        .with_condiment(
                            Condiment::new("SAM", "Sambal", Money::new(500)).with_quantity(i64::MAX),
                        ),
                ),
            )
            .into();

        let amounts = calculate_line(&item);
        assert_eq!(amounts.base, Money::new(i64::MAX));
        assert!(amounts.service_tax > Money::zero());
    }

    #[test]
    fn test_precomputed_tax_is_authoritative_and_scaled() {
        let item: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_quantity(2)
            .with_tax(pb1().with_precomputed(1_818.25))
            .with_condiment(
                Condiment::new("EGG", "Telur", Money::new(4_000))
                    .with_quantity(2)
                    .with_tax(TaxRate::new("PPN", 11.0).with_precomputed(440.0)),
            )
            .into();

        let amounts = calculate_line(&item);
        // round(1818.25 × 2)
        assert_eq!(amounts.service_tax, Money::new(3_637));
        // 440 × 2 × 2
        assert_eq!(amounts.value_added_tax, Money::new(1_760));
    }

    #[test]
    fn test_zero_precomputed_falls_back_to_percentage() {
        let item: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000))
            .with_tax(pb1().with_precomputed(0.0))
            .into();
        assert_eq!(calculate_line(&item).service_tax, Money::new(1_800));
    }

    #[test]
    fn test_unknown_tax_names_are_dropped() {
        let item: LineItem = MenuLine::new("NG01", "Nasi Goreng", Money::new(10_000))
            .with_tax(TaxRate::new("pb1", 10.0))
            .with_tax(TaxRate::new("ppn_jakarta", 11.0))
            .with_tax(TaxRate::new("SERVICE_FEE", 5.0))
            .into();

        let amounts = calculate_line(&item);
        assert_eq!(amounts.service_tax, Money::new(1_000));
        assert_eq!(amounts.value_added_tax, Money::new(1_100));
        assert_eq!(amounts.tax_total(), Money::new(2_100));
    }

    #[test]
    fn test_combo_multipliers() {
        let item: LineItem = ComboLine::new("CB1", "Paket")
            .with_quantity(3)
            .with_block(
                ComboBlock::new(2).with_product(
                    ComboProduct::new("P1", "Ayam", Money::new(1_000))
                        .with_quantity(5)
                        .with_tax(TaxRate::new("PB1", 10.0).with_precomputed(100.0))
                        .with_condiment(
                            Condiment::new("SAM", "Sambal", Money::new(500)).with_quantity(2),
                        ),
                ),
            )
            .into();

        let amounts = calculate_line(&item);
        // product: 1.000 × 5 × 2 × 3 = 30.000; condiment: 500 × 2 × 30 = 30.000
        assert_eq!(amounts.base, Money::new(60_000));
        // precomputed 100 × 30
        assert_eq!(amounts.service_tax, Money::new(3_000));
    }

    #[test]
    fn test_empty_combo_is_zero() {
        let item: LineItem = ComboLine::new("CB0", "Kosong").into();
        assert_eq!(calculate_line(&item), LineAmounts::default());
    }
}
