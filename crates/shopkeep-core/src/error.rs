//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopkeep-core errors (this file)                                      │
//! │  ├── CoreError        - Cart / catalog rule violations                 │
//! │  └── ValidationError  - Input and order validation failures            │
//! │                                                                         │
//! │  shopkeep-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - Order submission failures                      │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Operator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested cart quantity exceeds the product's known stock.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart: OIL-1 x3, stock 3
    ///      │
    ///      ▼
    /// add_line(OIL-1)  → candidate 4 > 3
    ///      │
    ///      ▼
    /// InsufficientStock { code: "OIL-1", available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// Cart unchanged, operator warned
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for the "requested quantity exceeds stock" class of errors.
    pub fn is_capacity(&self) -> bool {
        matches!(self, CoreError::InsufficientStock { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The field-level variants come from product forms; the order-level
/// variants are the submission checks of the order builder, listed in the
/// order they are evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, unparsable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Amount beyond what the store can record.
    #[error("{field} exceeds the largest accepted amount {max}")]
    AmountTooLarge { field: String, max: Money },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    // -------------------------------------------------------------------------
    // Order submission checks
    // -------------------------------------------------------------------------
    /// Nothing to sell.
    #[error("Cart is empty")]
    EmptyCart,

    /// Order-level discount below zero.
    #[error("Discount cannot be negative")]
    NegativeDiscount,

    /// Order-level discount larger than the cart subtotal.
    #[error("Discount {discount} exceeds cart total {cart_total}")]
    DiscountExceedsCartTotal { discount: Money, cart_total: Money },

    /// A debt was entered without naming the customer who owes it.
    #[error("Customer name is required when the order carries debt")]
    CustomerNameRequired,

    /// Debt larger than what the customer has to pay.
    #[error("Debt {debt} exceeds payable amount {payable}")]
    DebtExceedsPayable { debt: Money, payable: Money },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive { field: field.into() }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative { field: field.into() }
    }

    pub fn too_large(field: impl Into<String>) -> Self {
        ValidationError::AmountTooLarge {
            field: field.into(),
            max: Money::MAX,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            code: "OIL-1".to_string(),
            available: 3,
            requested: 4,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for OIL-1: available 3, requested 4"
        );
        assert!(err.is_capacity());
    }

    #[test]
    fn test_order_validation_messages() {
        let err = ValidationError::DiscountExceedsCartTotal {
            discount: Money::from_cents(25000),
            cart_total: Money::from_cents(20000),
        };
        assert_eq!(err.to_string(), "Discount 250.00 exceeds cart total 200.00");

        let err = ValidationError::DebtExceedsPayable {
            debt: Money::from_cents(16000),
            payable: Money::from_cents(15000),
        };
        assert_eq!(err.to_string(), "Debt 160.00 exceeds payable amount 150.00");

        assert_eq!(
            ValidationError::too_large("custom price").to_string(),
            "custom price exceeds the largest accepted amount 999999999.99"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("code").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_capacity());
    }
}
