//! # Tax Categories
//!
//! Restaurants in this deployment charge two taxes:
//!
//! - **PB1** (Pajak Barang dan Jasa / restaurant service tax), usually 10%
//! - **PPN** (Pajak Pertambahan Nilai / value-added tax), usually 11%
//!
//! The upstream catalog does not tag taxes with a category. Every tax entry
//! only carries a free-form name ("PB1", "ppn_jakarta", "PB 1 Resto"), so the
//! category is recovered by a case-insensitive substring match. Names that
//! match neither category are ignored for aggregate totals.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use ts_rs::TS;

use crate::money::Money;

/// Name emitted for the service tax in the order summary.
pub const SERVICE_TAX_NAME: &str = "PB1";

/// Name emitted for the value-added tax in the order summary.
pub const VALUE_ADDED_TAX_NAME: &str = "PPN";

/// Percentage reported for the service tax in the order summary, regardless
/// of the per-item rates that produced the amount.
pub const SERVICE_TAX_SUMMARY_PERCENTAGE: f64 = 10.0;

/// Percentage reported for the value-added tax in the order summary.
pub const VALUE_ADDED_TAX_SUMMARY_PERCENTAGE: f64 = 11.0;

// =============================================================================
// Tax Category
// =============================================================================

/// The two recognised tax buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TaxCategory {
    /// Restaurant service tax (PB1).
    Service,
    /// Value-added tax (PPN).
    ValueAdded,
}

impl TaxCategory {
    /// Routes a tax name to its bucket.
    ///
    /// "PB" is checked first, so a name carrying both markers lands in the
    /// service bucket.
    ///
    /// ```rust
    /// use meja_core::tax::TaxCategory;
    ///
    /// assert_eq!(TaxCategory::from_name("PB1"), Some(TaxCategory::Service));
    /// assert_eq!(TaxCategory::from_name("ppn_jakarta"), Some(TaxCategory::ValueAdded));
    /// assert_eq!(TaxCategory::from_name("SERVICE_FEE"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<TaxCategory> {
        let upper = name.to_uppercase();
        if upper.contains("PB") {
            Some(TaxCategory::Service)
        } else if upper.contains("PPN") {
            Some(TaxCategory::ValueAdded)
        } else {
            None
        }
    }

    /// Name used in the order summary.
    pub fn summary_name(&self) -> &'static str {
        match self {
            TaxCategory::Service => SERVICE_TAX_NAME,
            TaxCategory::ValueAdded => VALUE_ADDED_TAX_NAME,
        }
    }

    /// Fixed percentage used in the order summary.
    pub fn summary_percentage(&self) -> f64 {
        match self {
            TaxCategory::Service => SERVICE_TAX_SUMMARY_PERCENTAGE,
            TaxCategory::ValueAdded => VALUE_ADDED_TAX_SUMMARY_PERCENTAGE,
        }
    }
}

// =============================================================================
// Tax Buckets
// =============================================================================

/// Running totals for the two tax categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxBuckets {
    pub service_tax: Money,
    pub value_added_tax: Money,
}

impl TaxBuckets {
    /// Adds `amount` to the bucket named by `tax_name`.
    ///
    /// Returns `false` when the name is not recognised and the amount was
    /// dropped.
    pub fn add_named(&mut self, tax_name: &str, amount: Money) -> bool {
        match TaxCategory::from_name(tax_name) {
            Some(category) => {
                self.add(category, amount);
                true
            }
            None => false,
        }
    }

    pub fn add(&mut self, category: TaxCategory, amount: Money) {
        match category {
            TaxCategory::Service => self.service_tax += amount,
            TaxCategory::ValueAdded => self.value_added_tax += amount,
        }
    }

    pub fn get(&self, category: TaxCategory) -> Money {
        match category {
            TaxCategory::Service => self.service_tax,
            TaxCategory::ValueAdded => self.value_added_tax,
        }
    }

    /// Sum of both buckets.
    pub fn total(&self) -> Money {
        self.service_tax + self.value_added_tax
    }
}

impl AddAssign for TaxBuckets {
    fn add_assign(&mut self, other: Self) {
        self.service_tax += other.service_tax;
        self.value_added_tax += other.value_added_tax;
    }
}
