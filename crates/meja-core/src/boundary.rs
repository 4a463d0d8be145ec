//! # Boundary Parsing
//!
//! Turns untrusted JSON into the strict line-item types. Everything that
//! reaches the calculator has been through here exactly once.
//!
//! ## Accepted Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Own cart entries       { "kind": "menu" | "combo", ... }            │
//! │  2. Legacy wrappers        { "type": "menu", "menu": {...}, "note" }    │
//! │                            { "type": "combo", "combo": {...} }          │
//! │  3. Upstream order echo    { "menus": [...], "combos": [...] }          │
//! │                            optionally nested under "data"               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Fallbacks
//! | Field              | Keys tried, in order                                   |
//! |--------------------|--------------------------------------------------------|
//! | code               | `code`, `id`, `menuCode` / `comboCode`, `name`         |
//! | unit price (menu)  | `detailPrice`, `unitPrice`, `price`                    |
//! | reported price     | `reportedPrice`, `price`                               |
//! | unit price (other) | `price`, `unitPrice`, `detailPrice`                    |
//! | quantity           | `qty`, `quantity`                                      |
//! | tax name           | `taxName`, `categoryName`, `name`                      |
//! | tax percentage     | `taxPercentage`, `percentage`, `percent`, `value`      |
//! | tax amount         | `taxAmount`, `precomputedAmount`, `amount`             |
//!
//! Numbers may arrive as JSON numbers or numeric strings. Missing prices
//! become 0; missing, zero, negative or unparseable quantities become 1.
//! Nothing here fails: a value that cannot be read at all yields `None` and
//! is skipped by the list parsers.

use serde_json::{Map, Value};

use crate::money::Money;
use crate::types::{
    ComboBlock, ComboLine, ComboProduct, Condiment, LineItem, MenuLine, TaxRate,
};
use crate::validation::normalize_quantity;
use crate::DEFAULT_QUANTITY;

type Object = Map<String, Value>;

const MENU_CODE_KEYS: &[&str] = &["code", "id", "menuCode", "name"];
const COMBO_CODE_KEYS: &[&str] = &["code", "id", "comboCode", "name"];
const ITEM_CODE_KEYS: &[&str] = &["code", "id", "name"];
const NAME_KEYS: &[&str] = &["name", "menuName", "comboName", "productName"];
const MENU_UNIT_PRICE_KEYS: &[&str] = &["detailPrice", "unitPrice", "price"];
const REPORTED_PRICE_KEYS: &[&str] = &["reportedPrice", "price"];
const UNIT_PRICE_KEYS: &[&str] = &["price", "unitPrice", "detailPrice"];
const QUANTITY_KEYS: &[&str] = &["qty", "quantity"];
const NOTE_KEYS: &[&str] = &["note", "notes"];
const TAX_NAME_KEYS: &[&str] = &["taxName", "categoryName", "name"];
const TAX_PERCENTAGE_KEYS: &[&str] = &["taxPercentage", "percentage", "percent", "value"];
const TAX_AMOUNT_KEYS: &[&str] = &["taxAmount", "precomputedAmount", "amount"];
const ORDER_TOTAL_KEYS: &[&str] = &["grandTotal", "grossAmount", "total"];

// =============================================================================
// Public Entry Points
// =============================================================================

/// Parses one cart entry in any accepted shape.
pub fn parse_line_item(value: &Value) -> Option<LineItem> {
    let obj = value.as_object()?;

    match text(obj, &["kind"]).as_str() {
        "menu" => return Some(parse_menu(obj, None).into()),
        "combo" => return Some(parse_combo(obj, None).into()),
        _ => {}
    }

    if let Some(kind) = obj.get("type").and_then(Value::as_str) {
        let outer_note = non_empty(text(obj, NOTE_KEYS));
        if kind.eq_ignore_ascii_case("combo") {
            if let Some(inner) = obj.get("combo").and_then(Value::as_object) {
                return Some(parse_combo(inner, outer_note).into());
            }
        } else if let Some(inner) = obj.get("menu").and_then(Value::as_object) {
            return Some(parse_menu(inner, outer_note).into());
        }
    }

    if looks_like_combo(obj) {
        Some(parse_combo(obj, None).into())
    } else if has_any(obj, MENU_CODE_KEYS) {
        Some(parse_menu(obj, None).into())
    } else {
        None
    }
}

/// Parses a list of cart entries or an upstream order echo.
///
/// Entries that cannot be read are skipped.
pub fn parse_order_lines(value: &Value) -> Vec<LineItem> {
    match value {
        Value::Array(entries) => entries.iter().filter_map(parse_line_item).collect(),
        Value::Object(obj) => {
            if obj.contains_key("menus") || obj.contains_key("combos") {
                let menus = array(obj, "menus")
                    .filter_map(Value::as_object)
                    .map(|menu| LineItem::from(parse_menu(menu, None)));
                let combos = array(obj, "combos")
                    .filter_map(Value::as_object)
                    .map(|combo| LineItem::from(parse_combo(combo, None)));
                menus.chain(combos).collect()
            } else if let Some(inner) = obj.get("data") {
                parse_order_lines(inner)
            } else if let Some(items) = obj.get("items").or_else(|| obj.get("cart")) {
                parse_order_lines(items)
            } else {
                parse_line_item(value).into_iter().collect()
            }
        }
        _ => Vec::new(),
    }
}

/// The grand total the upstream reported for an echoed order, if any.
pub fn order_amount(value: &Value) -> Option<Money> {
    let obj = value.as_object()?;
    if let Some(inner) = obj.get("data").filter(|v| v.is_object()) {
        return order_amount(inner);
    }
    number(obj, ORDER_TOTAL_KEYS).map(Money::round_from)
}

/// Reads a JSON number or numeric string.
///
/// ```rust
/// use meja_core::boundary::parse_number;
/// use serde_json::json;
///
/// assert_eq!(parse_number(&json!(12.5)), Some(12.5));
/// assert_eq!(parse_number(&json!(" 18000 ")), Some(18000.0));
/// assert_eq!(parse_number(&json!("abc")), None);
/// ```
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

// =============================================================================
// Line Parsers
// =============================================================================

fn parse_menu(obj: &Object, outer_note: Option<String>) -> MenuLine {
    let unit_price = money(obj, MENU_UNIT_PRICE_KEYS).unwrap_or_default();

    MenuLine {
        code: text(obj, MENU_CODE_KEYS),
        name: text(obj, NAME_KEYS),
        unit_price,
        reported_price: money(obj, REPORTED_PRICE_KEYS),
        quantity: quantity(obj),
        condiments: array(obj, "condiments").filter_map(parse_condiment).collect(),
        taxes: parse_taxes(obj),
        note: note(obj, outer_note),
    }
}

fn parse_combo(obj: &Object, outer_note: Option<String>) -> ComboLine {
    let mut blocks: Vec<ComboBlock> = array(obj, "blocks")
        .chain(array(obj, "details"))
        .filter_map(parse_block)
        .collect();

    // Flat combos list their products directly.
    if blocks.is_empty() {
        let products: Vec<ComboProduct> = array(obj, "products")
            .chain(array(obj, "items"))
            .filter_map(parse_product)
            .collect();
        if !products.is_empty() {
            blocks.push(ComboBlock {
                quantity: DEFAULT_QUANTITY,
                products,
            });
        }
    }

    ComboLine {
        code: text(obj, COMBO_CODE_KEYS),
        name: text(obj, NAME_KEYS),
        quantity: quantity(obj),
        note: note(obj, outer_note),
        blocks,
    }
}

fn parse_block(value: &Value) -> Option<ComboBlock> {
    let obj = value.as_object()?;
    Some(ComboBlock {
        quantity: quantity(obj),
        products: array(obj, "products")
            .chain(array(obj, "items"))
            .filter_map(parse_product)
            .collect(),
    })
}

fn parse_product(value: &Value) -> Option<ComboProduct> {
    let obj = value.as_object()?;
    Some(ComboProduct {
        code: text(obj, ITEM_CODE_KEYS),
        name: text(obj, NAME_KEYS),
        unit_price: money(obj, UNIT_PRICE_KEYS).unwrap_or_default(),
        quantity: quantity(obj),
        condiments: array(obj, "condiments").filter_map(parse_condiment).collect(),
        taxes: parse_taxes(obj),
    })
}

fn parse_condiment(value: &Value) -> Option<Condiment> {
    let obj = value.as_object()?;
    Some(Condiment {
        code: text(obj, ITEM_CODE_KEYS),
        name: text(obj, NAME_KEYS),
        unit_price: money(obj, UNIT_PRICE_KEYS).unwrap_or_default(),
        quantity: quantity(obj),
        taxes: parse_taxes(obj),
    })
}

fn parse_taxes(obj: &Object) -> Vec<TaxRate> {
    array(obj, "taxes").filter_map(parse_tax).collect()
}

fn parse_tax(value: &Value) -> Option<TaxRate> {
    let obj = value.as_object()?;
    Some(TaxRate {
        category_name: text(obj, TAX_NAME_KEYS),
        percentage: number(obj, TAX_PERCENTAGE_KEYS).unwrap_or(0.0),
        precomputed_amount: number(obj, TAX_AMOUNT_KEYS),
    })
}

// =============================================================================
// Field Helpers
// =============================================================================

fn looks_like_combo(obj: &Object) -> bool {
    obj.contains_key("blocks") || obj.contains_key("details") || obj.contains_key("comboCode")
}

fn has_any(obj: &Object, keys: &[&str]) -> bool {
    keys.iter().any(|key| obj.get(*key).is_some_and(|v| !v.is_null()))
}

/// First present, non-null value among `keys`.
fn field<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

fn text(obj: &Object, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

fn number(obj: &Object, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(parse_number)
}

fn money(obj: &Object, keys: &[&str]) -> Option<Money> {
    number(obj, keys).map(Money::round_from)
}

fn quantity(obj: &Object) -> i64 {
    match field(obj, QUANTITY_KEYS).and_then(parse_number) {
        Some(n) if n >= 1.0 => normalize_quantity(n.trunc() as i64),
        _ => DEFAULT_QUANTITY,
    }
}

fn note(obj: &Object, outer_note: Option<String>) -> String {
    non_empty(text(obj, NOTE_KEYS))
        .or(outer_note)
        .unwrap_or_default()
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn array<'a>(obj: &'a Object, key: &str) -> std::slice::Iter<'a, Value> {
    let values: &'a [Value] = match obj.get(key) {
        Some(Value::Array(values)) => values,
        _ => &[],
    };
    values.iter()
}

// =============================================================================
// Unit Tests
// =============================================================================
