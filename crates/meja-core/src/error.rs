//! # Error Types
//!
//! Domain-specific error types for meja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meja-core errors (this file)                                           │
//! │  ├── CoreError        - Domain errors at the request edge               │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  meja-db errors          └── DbError       - Storage failures           │
//! │  meja-gateway errors     └── GatewayError  - Network / config / token   │
//! │  meja-api errors         └── ApiError      - What the SPA sees          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → { code, message }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing and normalisation never produce these. Malformed data is
//! defaulted at the boundary instead; errors only describe requests that
//! cannot be honoured at all.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Requests the domain cannot honour.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    /// No cart entry exists at the given position.
    #[error("Cart has no item at index {index} (size {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Views are `checkout`, `order-status` and `bill`.
    #[error("Unknown pricing view: {0}")]
    UnknownPricingView(String),

    #[error("Cart is empty")]
    EmptyCart,

    /// No user session (store/table) has been established yet.
    #[error("No active session: scan the table QR code first")]
    NoSession,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A request field the edge refuses. `field` uses the JSON name the SPA sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    /// Measured in characters, not bytes.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Cart has no item at index 4 (size 2)");

        let err = CoreError::UnknownPricingView("receipt".to_string());
        assert_eq!(err.to_string(), "Unknown pricing view: receipt");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "storeCode".to_string(),
        };
        assert_eq!(validation_err.to_string(), "storeCode is required");

        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
