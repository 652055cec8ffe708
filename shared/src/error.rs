//! Domain errors raised by the ledger engine and the health deriver

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the domain core
///
/// Storage implementations map their own failures into
/// [`LedgerError::Storage`] or keep a richer error type of their own that
/// implements `From<LedgerError>`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error(
        "Insufficient stock for product {product_id} at location {location_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        location_id: i64,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Conflict on {resource}: {message}")]
    Conflict { resource: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        LedgerError::NotFound(resource.into())
    }

    /// Whether the error was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
