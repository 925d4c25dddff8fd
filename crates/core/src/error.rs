//! Domain error model.

use thiserror::Error;

use crate::code::LocationCode;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Which balance a stock check refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockScope {
    /// The per-location balance of one item.
    Location(LocationCode),
    /// The item's aggregate balance across every location.
    Total,
}

impl core::fmt::Display for StockScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockScope::Location(code) => write!(f, "location '{code}'"),
            StockScope::Total => f.write_str("total"),
        }
    }
}

/// Domain-level error.
///
/// Deterministic failures only (bad input, missing items, short balances).
/// Storage failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (empty code, non-positive quantity, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The targeted item is not defined.
    #[error("item '{0}' not found")]
    NotFound(String),

    /// A removal asks for more than the balance holds.
    #[error("insufficient {scope} stock: available {available}, requested {requested}")]
    InsufficientStock {
        scope: StockScope,
        available: i64,
        requested: i64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound(item.into())
    }

    pub fn insufficient(scope: StockScope, available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            scope,
            available,
            requested,
        }
    }
}
