//! # Domain Types
//!
//! The cart line-item model shared by every pricing view.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          LineItem (kind)                                │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐     │
//! │  │  Menu                    │      │  Combo                       │     │
//! │  │  ──────────────────────  │      │  ──────────────────────────  │     │
//! │  │  code, name, note        │      │  code, name, note, quantity  │     │
//! │  │  unit_price              │      │  blocks ─┐                   │     │
//! │  │  reported_price?         │      └──────────┼───────────────────┘     │
//! │  │  quantity                │                 ▼                         │
//! │  │  taxes: [TaxRate]        │      ┌──────────────────────────────┐     │
//! │  │  condiments ─┐           │      │  ComboBlock { quantity }     │     │
//! │  └──────────────┼───────────┘      │  products ─┐                 │     │
//! │                 ▼                  └────────────┼─────────────────┘     │
//! │  ┌──────────────────────────┐                   ▼                       │
//! │  │  Condiment               │◄──── ComboProduct { unit_price,           │
//! │  │  unit_price, quantity    │        quantity, taxes, condiments }      │
//! │  │  taxes                   │                                           │
//! │  └──────────────────────────┘                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are always at least 1. Construction from untrusted JSON goes
//! through [`crate::boundary`], which applies the defaulting rules once.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::normalize_quantity;

/// Separator between the parts of a cart signature.
pub const SIGNATURE_SEPARATOR: &str = "|";

// =============================================================================
// Tax Rate
// =============================================================================

/// A tax attached to a product or condiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    /// Free-form tax name; the category is derived from it.
    pub category_name: String,

    /// Rate in percent (10 = 10%).
    pub percentage: f64,

    /// Per-unit tax amount computed by the upstream, if it sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precomputed_amount: Option<f64>,
}

impl TaxRate {
    pub fn new(category_name: impl Into<String>, percentage: f64) -> Self {
        TaxRate {
            category_name: category_name.into(),
            percentage,
            precomputed_amount: None,
        }
    }

    pub fn with_precomputed(mut self, amount: f64) -> Self {
        self.precomputed_amount = Some(amount);
        self
    }

    /// The precomputed per-unit amount when present and non-zero.
    pub fn authoritative_amount(&self) -> Option<f64> {
        self.precomputed_amount
            .filter(|amount| amount.is_finite() && *amount != 0.0)
    }
}

// =============================================================================
// Condiment
// =============================================================================

/// An add-on attached to a menu item or a combo product.
///
/// `quantity` is per unit of the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Condiment {
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub taxes: Vec<TaxRate>,
}

impl Condiment {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        Condiment {
            code: code.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            taxes: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = normalize_quantity(quantity);
        self
    }

    pub fn with_tax(mut self, tax: TaxRate) -> Self {
        self.taxes.push(tax);
        self
    }

    /// Price of this condiment at its own quantity.
    pub fn unit_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Menu Line
// =============================================================================

/// A standalone menu product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuLine {
    pub code: String,
    pub name: String,

    /// The product's own (detail) price.
    pub unit_price: Money,

    /// Price the source reported for one item. Depending on where the item
    /// came from this either equals `unit_price` or already includes the
    /// condiments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_price: Option<Money>,

    pub quantity: i64,

    #[serde(default)]
    pub condiments: Vec<Condiment>,

    #[serde(default)]
    pub taxes: Vec<TaxRate>,

    #[serde(default)]
    pub note: String,
}

impl MenuLine {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        MenuLine {
            code: code.into(),
            name: name.into(),
            unit_price,
            reported_price: None,
            quantity: 1,
            condiments: Vec::new(),
            taxes: Vec::new(),
            note: String::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = normalize_quantity(quantity);
        self
    }

    pub fn with_reported_price(mut self, price: Money) -> Self {
        self.reported_price = Some(price);
        self
    }

    pub fn with_condiment(mut self, condiment: Condiment) -> Self {
        self.condiments.push(condiment);
        self
    }

    pub fn with_tax(mut self, tax: TaxRate) -> Self {
        self.taxes.push(tax);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sum of condiment prices for the whole line.
    pub fn condiment_unit_total(&self) -> Money {
        self.condiments.iter().map(Condiment::unit_total).sum()
    }

    /// True when `reported_price` already includes the condiments.
    ///
    /// The local cart stores the bare product price while the upstream echo
    /// reports the price with add-ons folded in. Comparing the reported price
    /// against `unit_price + condiments` tells the two apart.
    pub fn condiments_folded(&self) -> bool {
        if self.condiments.is_empty() {
            return false;
        }
        self.reported_price == Some(self.unit_price + self.condiment_unit_total())
    }

    /// The item's own unit price, never including condiments.
    pub fn own_unit_price(&self) -> Money {
        if self.condiments_folded() {
            self.unit_price
        } else {
            self.reported_price.unwrap_or(self.unit_price)
        }
    }
}

// =============================================================================
// Combo Line
// =============================================================================

/// One product picked inside a combo block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboProduct {
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub condiments: Vec<Condiment>,
    #[serde(default)]
    pub taxes: Vec<TaxRate>,
}

impl ComboProduct {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        ComboProduct {
            code: code.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            condiments: Vec::new(),
            taxes: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = normalize_quantity(quantity);
        self
    }

    pub fn with_condiment(mut self, condiment: Condiment) -> Self {
        self.condiments.push(condiment);
        self
    }

    pub fn with_tax(mut self, tax: TaxRate) -> Self {
        self.taxes.push(tax);
        self
    }
}

/// One product-group selection of a combo, with its own multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboBlock {
    pub quantity: i64,
    #[serde(default)]
    pub products: Vec<ComboProduct>,
}

impl ComboBlock {
    pub fn new(quantity: i64) -> Self {
        ComboBlock {
            quantity: normalize_quantity(quantity),
            products: Vec::new(),
        }
    }

    pub fn with_product(mut self, product: ComboProduct) -> Self {
        self.products.push(product);
        self
    }
}

/// A combo bundle in the cart. Its price is always derived from the blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboLine {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub blocks: Vec<ComboBlock>,
}

impl ComboLine {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        ComboLine {
            code: code.into(),
            name: name.into(),
            quantity: 1,
            note: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = normalize_quantity(quantity);
        self
    }

    pub fn with_block(mut self, block: ComboBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One cart entry: a menu product or a combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LineItem {
    Menu(MenuLine),
    Combo(ComboLine),
}

impl LineItem {
    pub fn code(&self) -> &str {
        match self {
            LineItem::Menu(menu) => &menu.code,
            LineItem::Combo(combo) => &combo.code,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LineItem::Menu(menu) => &menu.name,
            LineItem::Combo(combo) => &combo.name,
        }
    }

    pub fn note(&self) -> &str {
        match self {
            LineItem::Menu(menu) => &menu.note,
            LineItem::Combo(combo) => &combo.note,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            LineItem::Menu(menu) => menu.quantity,
            LineItem::Combo(combo) => combo.quantity,
        }
    }

    /// Sets the outer quantity, clamped to at least 1.
    pub fn set_quantity(&mut self, quantity: i64) {
        let quantity = normalize_quantity(quantity);
        match self {
            LineItem::Menu(menu) => menu.quantity = quantity,
            LineItem::Combo(combo) => combo.quantity = quantity,
        }
    }

    /// Identity of a cart configuration: product code, serialised condiments
    /// (blocks for a combo) and note, joined by [`SIGNATURE_SEPARATOR`].
    ///
    /// Two entries with the same signature are the same configuration and
    /// merge their quantities when freshly added.
    pub fn signature(&self) -> String {
        let condiments = match self {
            LineItem::Menu(menu) => serde_json::to_string(&menu.condiments),
            LineItem::Combo(combo) => serde_json::to_string(&combo.blocks),
        }
        .unwrap_or_default();

        [self.code(), condiments.as_str(), self.note()].join(SIGNATURE_SEPARATOR)
    }

    pub fn is_combo(&self) -> bool {
        matches!(self, LineItem::Combo(_))
    }
}

impl From<MenuLine> for LineItem {
    fn from(menu: MenuLine) -> Self {
        LineItem::Menu(menu)
    }
}

impl From<ComboLine> for LineItem {
    fn from(combo: ComboLine) -> Self {
        LineItem::Combo(combo)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
