//! # Session Records
//!
//! What the ordering flow remembers between requests besides the cart:
//! who is ordering (store, table, dine-in or take-away) and the snapshot
//! taken at checkout that the payment screen works from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::normalize::OrderPayload;
use crate::types::LineItem;

// =============================================================================
// Order Type
// =============================================================================

/// How the order is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderType {
    /// Eaten at the table the QR code belongs to.
    #[serde(rename = "DI")]
    DineIn,
    /// Picked up at the counter.
    #[serde(rename = "TA")]
    TakeAway,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

impl OrderType {
    /// Wire code used by the upstream API.
    pub fn code(&self) -> &'static str {
        match self {
            OrderType::DineIn => "DI",
            OrderType::TakeAway => "TA",
        }
    }
}

// =============================================================================
// User Session
// =============================================================================

/// Identity of the current orderer. There is no login; scanning the table
/// QR code establishes this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Store code the table belongs to.
    pub store_location: String,
    pub order_type: OrderType,
    pub table_number: String,
}

impl UserSession {
    pub fn dine_in(store_location: impl Into<String>, table_number: impl Into<String>) -> Self {
        UserSession {
            store_location: store_location.into(),
            order_type: OrderType::DineIn,
            table_number: table_number.into(),
        }
    }
}

// =============================================================================
// Payment Session
// =============================================================================

/// Snapshot written once when the customer confirms checkout.
///
/// The cart is cleared after the order is submitted, so the payment and
/// receipt screens read the items from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// The cart exactly as it was at checkout.
    pub cart_raw: Vec<LineItem>,
    /// The normalised body sent to the upstream order API.
    pub cart_do_order: OrderPayload,
    pub payment_total: Money,
    pub store_code: String,
    pub order_type: OrderType,
    pub table_number: String,
    /// Gateway order id used for status polling.
    #[serde(default)]
    pub order_id: String,
    /// Order code returned by the upstream, once submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_code: Option<String>,
    #[ts(as = "String")]
    pub saved_at: DateTime<Utc>,
}

impl PaymentSession {
    /// Builds the snapshot for `user` at checkout time.
    pub fn capture(
        user: &UserSession,
        cart: Vec<LineItem>,
        payload: OrderPayload,
        order_id: impl Into<String>,
    ) -> Self {
        PaymentSession {
            payment_total: payload.grand_total,
            cart_raw: cart,
            cart_do_order: payload,
            store_code: user.store_location.clone(),
            order_type: user.order_type,
            table_number: user.table_number.clone(),
            order_id: order_id.into(),
            order_code: None,
            saved_at: Utc::now(),
        }
    }

    /// The upstream order code, when this snapshot was already submitted
    /// for the same table and an identical cart.
    pub fn submitted_order_for(&self, user: &UserSession, cart: &[LineItem]) -> Option<&str> {
        let same_table = self.store_code == user.store_location
            && self.table_number == user.table_number
            && self.order_type == user.order_type;
        if !same_table || self.cart_raw.as_slice() != cart {
            return None;
        }
        self.order_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_order;
    use crate::types::MenuLine;

    #[test]
    fn test_order_type_wire_codes() {
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), "\"DI\"");
        assert_eq!(serde_json::to_string(&OrderType::TakeAway).unwrap(), "\"TA\"");
        assert_eq!(OrderType::default(), OrderType::DineIn);
        assert_eq!(OrderType::TakeAway.code(), "TA");
    }

    #[test]
    fn test_user_session_json_shape() {
        let session = UserSession::dine_in("JKT-01", "12");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["storeLocation"], "JKT-01");
        assert_eq!(json["orderType"], "DI");
        assert_eq!(json["tableNumber"], "12");
    }

    #[test]
    fn test_payment_session_capture() {
        let user = UserSession::dine_in("JKT-01", "12");
        let cart: Vec<LineItem> =
            vec![MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000)).into()];
        let payload = normalize_order(&cart, None);

        let session = PaymentSession::capture(&user, cart.clone(), payload, "ORD-1");
        assert_eq!(session.payment_total, Money::new(18_000));
        assert_eq!(session.cart_raw, cart);
        assert_eq!(session.store_code, "JKT-01");
        assert_eq!(session.order_id, "ORD-1");

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("cartDoOrder").is_some());
        assert!(json.get("savedAt").is_some());
    }

    #[test]
    fn test_submitted_order_matches_same_cart_only() {
        let user = UserSession::dine_in("JKT-01", "12");
        let cart: Vec<LineItem> =
            vec![MenuLine::new("NG01", "Nasi Goreng", Money::new(18_000)).into()];
        let mut session =
            PaymentSession::capture(&user, cart.clone(), normalize_order(&cart, None), "ORD-1");
        assert_eq!(session.submitted_order_for(&user, &cart), None);

        session.order_code = Some("A-17".into());
        assert_eq!(session.submitted_order_for(&user, &cart), Some("A-17"));

        let mut bigger = cart.clone();
        bigger[0].set_quantity(2);
        assert_eq!(session.submitted_order_for(&user, &bigger), None);
        let other_table = UserSession::dine_in("JKT-01", "13");
        assert_eq!(session.submitted_order_for(&other_table, &cart), None);
    }
}
