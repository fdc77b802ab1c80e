//! Business-rule failures raised by stock decisions.

use thiserror::Error;

use stockpile_core::{LocationId, ProductId};

pub type StockResult<T> = Result<T, StockError>;

/// Deterministic rejection of a stock mutation.
///
/// Every variant is raised before anything is written, so a rejected mutation
/// never leaves partial effects behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Malformed input (non-positive quantity, blank reason, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock: requested {requested}, only {available} on hand")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("insufficient available stock: requested {requested}, only {available} available")]
    InsufficientAvailableStock { requested: i64, available: i64 },

    #[error("cannot release {requested}: only {reserved} reserved")]
    ExcessiveRelease { requested: i64, reserved: i64 },

    /// The write would leave fewer units on hand than are reserved.
    #[error("quantity {quantity} would fall below reserved quantity {reserved}")]
    ReservedExceedsQuantity { quantity: i64, reserved: i64 },

    #[error("product mismatch: expected {expected}, stock record holds {actual}")]
    ProductMismatch { expected: ProductId, actual: ProductId },

    #[error("location mismatch: expected {expected}, stock record is at {actual}")]
    LocationMismatch { expected: LocationId, actual: LocationId },

    #[error("source and destination are the same stock key")]
    NoopTransfer,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
