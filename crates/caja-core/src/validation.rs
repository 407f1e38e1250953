//! # Validation Module
//!
//! Input validation utilities for Caja POS.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: Frontend (React)      - immediate format feedback
//! Layer 2: Server handler (Rust) - THIS MODULE: business rule validation
//! Layer 3: Database (SQLite)     - NOT NULL / UNIQUE / FK / CHECK constraints
//!
//! Defense in depth: multiple layers catch different errors.
//! ```

use crate::error::ValidationError;
use crate::money::Percent;
use crate::types::SaleItem;
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates a cart before it becomes a pending sale.
///
/// ## Rules
/// - Must contain at least one item
/// - At most [`MAX_SALE_ITEMS`] items
/// - Every quantity in 1..=[`MAX_ITEM_QUANTITY`]
/// - Unit and purchase prices must not be negative
pub fn validate_cart(items: &[SaleItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in items {
        if item.quantity <= 0 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if item.unit_price_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "unitPrice".to_string(),
            });
        }
        // The purchase-price snapshot feeds cost-of-goods and net-profit
        // folds; a negative cost would inflate every profit figure.
        if item.purchase_price_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "purchasePrice".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a cancellation reason.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 500 characters
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a percentage (discount or tax) and converts it to basis points.
///
/// ## Rules
/// - Must lie in the closed range [0, 100]
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_percentage;
///
/// assert_eq!(validate_percentage("taxPercentage", 21.0).unwrap().bps(), 2100);
/// assert!(validate_percentage("taxPercentage", 101.0).is_err());
/// assert!(validate_percentage("discount", -1.0).is_err());
/// ```
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<Percent> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(Percent::from_f64(pct))
}

// =============================================================================
// String / Amount Validators
// =============================================================================

/// Validates a display name (product, account, category, payment method).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates that a monetary amount is strictly positive.
///
/// Used for movements and expenses; direction is carried by the kind, the
/// amount itself is always positive.
pub fn validate_positive_amount(field: &str, amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity for restock operations.
pub fn validate_restock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64) -> SaleItem {
        SaleItem {
            product_id: None,
            name: "ad-hoc".to_string(),
            quantity: qty,
            unit_price_cents: 100,
            purchase_price_cents: 0,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(validate_cart(&[]).is_err());
        assert!(validate_cart(&[item(1)]).is_ok());
    }

    #[test]
    fn test_cart_quantity_bounds() {
        assert!(validate_cart(&[item(0)]).is_err());
        assert!(validate_cart(&[item(-3)]).is_err());
        assert!(validate_cart(&[item(MAX_ITEM_QUANTITY)]).is_ok());
        assert!(validate_cart(&[item(MAX_ITEM_QUANTITY + 1)]).is_err());
    }

    #[test]
    fn test_negative_prices_rejected() {
        let mut bad_unit = item(1);
        bad_unit.unit_price_cents = -100;
        assert!(validate_cart(std::slice::from_ref(&bad_unit)).is_err());

        let mut bad_cost = item(1);
        bad_cost.purchase_price_cents = -500;
        assert!(validate_cart(std::slice::from_ref(&bad_cost)).is_err());

        assert!(validate_cart(&[item(1)]).is_ok());
    }

    #[test]
    fn test_reason_required() {
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason("cliente se arrepintió").is_ok());
    }

    #[test]
    fn test_percentage_range() {
        assert!(validate_percentage("discount", 0.0).is_ok());
        assert!(validate_percentage("discount", 100.0).is_ok());
        assert!(validate_percentage("discount", 100.5).is_err());
        assert!(validate_percentage("discount", f64::NAN).is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(validate_positive_amount("amount", 0).is_err());
        assert!(validate_positive_amount("amount", -100).is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Caja principal").is_ok());
        assert!(validate_name(" ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }
}
