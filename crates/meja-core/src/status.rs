//! # Payment and Order Status
//!
//! Two independent status sources feed the order-status screen:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payment gateway transaction_status        Upstream order status code   │
//! │  ─────────────────────────────────         ──────────────────────────   │
//! │  settlement | capture | success → Paid     < 0   → AwaitingPayment      │
//! │  pending                        → Pending  >= 0  → Accepted             │
//! │  expire                         → Expired                               │
//! │  cancel | deny | failure        → Failed                                │
//! │  anything else                  → Pending                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Payment state of one gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Expired,
    Failed,
}

impl PaymentStatus {
    /// Maps a gateway `transaction_status` string. Unknown values are
    /// treated as still pending so polling continues.
    pub fn from_transaction_status(status: &str) -> PaymentStatus {
        match status.trim().to_ascii_lowercase().as_str() {
            "settlement" | "capture" | "success" => PaymentStatus::Paid,
            "expire" | "expired" => PaymentStatus::Expired,
            "cancel" | "deny" | "failure" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }

    /// Polling stops once a terminal state is reached.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// Fulfilment state reported by the upstream order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderProgress {
    /// Negative status code: the order exists but is not paid yet.
    AwaitingPayment,
    /// Zero or positive status code: accepted by the restaurant.
    Accepted,
}

impl OrderProgress {
    pub fn from_code(code: i64) -> OrderProgress {
        if code < 0 {
            OrderProgress::AwaitingPayment
        } else {
            OrderProgress::Accepted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_status_mapping() {
        assert_eq!(PaymentStatus::from_transaction_status("settlement"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_transaction_status("capture"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_transaction_status("SUCCESS"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_transaction_status("pending"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_transaction_status("expire"), PaymentStatus::Expired);
        assert_eq!(PaymentStatus::from_transaction_status("deny"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_transaction_status("cancel"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_transaction_status("authorize"), PaymentStatus::Pending);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Expired.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn test_order_progress_from_code() {
        assert_eq!(OrderProgress::from_code(-1), OrderProgress::AwaitingPayment);
        assert_eq!(OrderProgress::from_code(0), OrderProgress::Accepted);
        assert_eq!(OrderProgress::from_code(3), OrderProgress::Accepted);
    }
}
