//! # Validation Module
//!
//! Input checks for the request edge, plus the quantity defaulting rule
//! that every parser and builder shares.
//!
//! ## Two Kinds of Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Defaulting (never fails)           Validation (may reject)             │
//! │  ───────────────────────────        ─────────────────────────────       │
//! │  normalize_quantity                 validate_quantity                   │
//! │  used on stored / upstream data     used on customer input              │
//! │  0, -3, missing  →  1               0  →  "quantity must be between..." │
//! │  1e18  →  MAX_LINE_QUANTITY                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_LINE_QUANTITY, MAX_NOTE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Defaulting
// =============================================================================

/// Clamps a quantity into `1..=MAX_LINE_QUANTITY`.
///
/// ```rust
/// use meja_core::validation::normalize_quantity;
///
/// assert_eq!(normalize_quantity(3), 3);
/// assert_eq!(normalize_quantity(0), 1);
/// assert_eq!(normalize_quantity(-2), 1);
/// assert_eq!(normalize_quantity(i64::MAX), meja_core::MAX_LINE_QUANTITY);
/// ```
#[inline]
pub fn normalize_quantity(quantity: i64) -> i64 {
    quantity.clamp(1, MAX_LINE_QUANTITY)
}

// =============================================================================
// Validators
// =============================================================================

/// Validates a quantity entered by the customer.
///
/// ## Rules
/// - At least 1
/// - At most MAX_ITEM_QUANTITY (99)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a store code taken from a QR token or URL path.
///
/// ## Rules
/// - Not empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only (it becomes a path segment)
pub fn validate_store_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "storeCode".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "storeCode".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "storeCode".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a table number. Tables are labelled freely ("12", "A3",
/// "Teras-2") but must be present.
pub fn validate_table_number(table: &str) -> ValidationResult<()> {
    let table = table.trim();

    if table.is_empty() {
        return Err(ValidationError::Required {
            field: "tableNumber".to_string(),
        });
    }

    if table.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "tableNumber".to_string(),
            max: 20,
        });
    }

    Ok(())
}

/// Validates a kitchen note.
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }
    Ok(())
}

/// Validates that one more distinct entry fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_store_code() {
        assert!(validate_store_code("JKT-01").is_ok());
        assert!(validate_store_code("store_7").is_ok());

        assert!(validate_store_code("").is_err());
        assert!(validate_store_code("   ").is_err());
        assert!(validate_store_code("../admin").is_err());
        assert!(validate_store_code(&"S".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_table_number() {
        assert!(validate_table_number("12").is_ok());
        assert!(validate_table_number("Teras-2").is_ok());
        assert!(validate_table_number("").is_err());
    }

    #[test]
    fn test_validate_note_counts_characters() {
        assert!(validate_note("").is_ok());
        assert!(validate_note(&"é".repeat(MAX_NOTE_LENGTH)).is_ok());
        assert!(validate_note(&"a".repeat(MAX_NOTE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
