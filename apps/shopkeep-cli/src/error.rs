//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopkeep                               │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  │                                      │
//! │  sqlx::Error ──► DbError ────────┼──► ApiError { code, message }       │
//! │                                  │         │                            │
//! │  CheckoutError ──────────────────┘         ▼                            │
//! │                                  stderr, or JSON with --json            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` a failed command prints:
//! ```json
//! { "code": "VALIDATION_ERROR", "message": "Cart is empty" }
//! ```

use serde::Serialize;
use shopkeep_core::{CoreError, ValidationError};
use shopkeep_db::{CheckoutError, DbError};

/// Error returned from every command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable message for the operator
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,

    /// Input or order rule rejected
    ValidationError,

    DatabaseError,

    /// Cart or price editor misuse
    CartError,

    InsufficientStock,

    /// Submission failed after the order row was written
    CheckoutFailed,

    /// Order left half-written; check it by hand
    NeedsReconciliation,

    /// Another submission holds the draft
    Busy,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Duplicate {field}: '{value}' already exists"),
            ),
            DbError::InsufficientStock { product_id, requested } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!("Not enough stock for product {product_id} (requested {requested})"),
            ),
            DbError::CheckViolation(msg) => {
                tracing::warn!("Check constraint rejected write: {}", msg);
                ApiError::validation("Value rejected by the database")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::CorruptData { column, reason } => {
                tracing::error!(column = %column, "Corrupt stored value: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, format!("Stored data in {column} is unreadable"))
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::NotInCart(_) => ApiError::new(ErrorCode::CartError, err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => e.into(),
            CheckoutError::OrderCreation(e) => {
                tracing::error!("Order creation failed: {}", e);
                ApiError::new(ErrorCode::CheckoutFailed, format!("Order was not created: {e}"))
            }
            CheckoutError::RolledBack { .. } => {
                ApiError::new(ErrorCode::CheckoutFailed, err.to_string())
            }
            CheckoutError::CompensationFailed { .. } => {
                ApiError::new(ErrorCode::NeedsReconciliation, err.to_string())
            }
            CheckoutError::InProgress => ApiError::new(ErrorCode::Busy, err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::Money;

    #[test]
    fn test_duplicate_code_is_validation() {
        let err: ApiError = DbError::duplicate("code", "OIL-1").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Duplicate code: 'OIL-1' already exists");
    }

    #[test]
    fn test_checkout_validation_keeps_message() {
        let err: ApiError = CheckoutError::Validation(ValidationError::DebtExceedsPayable {
            debt: Money::from_cents(30000),
            payable: Money::from_cents(20000),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Debt 300.00 exceeds payable amount 200.00");
    }

    #[test]
    fn test_compensation_failure_needs_reconciliation() {
        let err: ApiError = CheckoutError::CompensationFailed {
            order_number: 4,
            order_id: "o-4".to_string(),
            reason: "database is locked".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NeedsReconciliation);
        assert!(err.message.contains("o-4"));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_string(&ApiError::not_found("Order", "#9")).unwrap();
        assert_eq!(json, r#"{"code":"NOT_FOUND","message":"Order not found: #9"}"#);
    }
}
