//! Ledger error model and SQLx error classification.
//!
//! ## Error Mapping
//!
//! | SQLx error | LedgerError |
//! |------------|-------------|
//! | Database (unique violation) | `DuplicateKey` |
//! | Database (foreign key violation) | `Referential` |
//! | Database (other) | `TransactionFailure` |
//! | PoolClosed, Io, RowNotFound, ... | `TransactionFailure` |
//!
//! A failed rollback wraps the failure that triggered it in `RollbackFailure`.

use thiserror::Error;

use warehouse_core::{DomainError, ItemCode, StockScope};

/// Ledger operation error.
///
/// Everything a caller can branch on: bad input, constraint violations,
/// short balances, and the two store-level failure classes.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Empty or non-positive input, rejected before touching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The item code is already defined.
    #[error("item code '{0}' already exists")]
    DuplicateKey(String),

    /// Stock was moved for an item code that has no definition.
    #[error("item code '{0}' is not defined")]
    Referential(String),

    /// The targeted item does not exist.
    #[error("item code '{0}' not found")]
    NotFound(String),

    /// The removal exceeds the location or total balance.
    #[error("insufficient {scope} stock: available {available}, requested {requested}")]
    InsufficientStock {
        scope: StockScope,
        available: i64,
        requested: i64,
    },

    /// Any other store failure; the transaction was rolled back.
    #[error("transaction failed in {operation}: {message}")]
    TransactionFailure {
        operation: &'static str,
        message: String,
    },

    /// Undoing a failed transaction failed too; stored state is unverified.
    #[error("rollback failed in {operation}: {message} (while undoing: {cause})")]
    RollbackFailure {
        operation: &'static str,
        message: String,
        #[source]
        cause: Box<LedgerError>,
    },
}

impl LedgerError {
    pub fn transaction(operation: &'static str, message: impl Into<String>) -> Self {
        Self::TransactionFailure {
            operation,
            message: message.into(),
        }
    }

    /// True when the operator may need to reconcile stored rows by hand.
    pub fn is_severe(&self) -> bool {
        matches!(self, LedgerError::RollbackFailure { .. })
    }

    /// True for failures caused by the request itself rather than the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            LedgerError::TransactionFailure { .. } | LedgerError::RollbackFailure { .. }
        )
    }
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::NotFound(item) => LedgerError::NotFound(item),
            DomainError::InsufficientStock {
                scope,
                available,
                requested,
            } => LedgerError::InsufficientStock {
                scope,
                available,
                requested,
            },
        }
    }
}

/// Map an SQLx error raised while working on `item`.
pub(crate) fn map_sqlx_error(operation: &'static str, item: &ItemCode, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                LedgerError::DuplicateKey(item.to_string())
            } else if db_err.is_foreign_key_violation() {
                LedgerError::Referential(item.to_string())
            } else {
                LedgerError::transaction(operation, format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolClosed => LedgerError::transaction(operation, "connection pool closed"),
        sqlx::Error::RowNotFound => LedgerError::transaction(operation, "unexpected row not found"),
        other => LedgerError::transaction(operation, format!("sqlx error: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_core::LocationCode;

    #[test]
    fn domain_errors_keep_their_kind() {
        let err: LedgerError = DomainError::validation("quantity must be positive").into();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err: LedgerError = DomainError::not_found("CPU-1").into();
        assert!(matches!(err, LedgerError::NotFound(code) if code == "CPU-1"));

        let scope = StockScope::Location(LocationCode::parse("A1").unwrap());
        let err: LedgerError = DomainError::insufficient(scope.clone(), 3, 5).into();
        assert_eq!(
            err.to_string(),
            "insufficient location 'A1' stock: available 3, requested 5"
        );
    }

    #[test]
    fn only_rollback_failures_are_severe() {
        let cause = LedgerError::transaction("stock_in", "disk I/O error");
        assert!(!cause.is_severe());
        assert!(!cause.is_rejection());

        let err = LedgerError::RollbackFailure {
            operation: "stock_in",
            message: "connection lost".to_string(),
            cause: Box::new(cause),
        };
        assert!(err.is_severe());
        assert!(err.to_string().contains("disk I/O error"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn pool_closed_is_a_transaction_failure() {
        let item = ItemCode::parse("CPU-1").unwrap();
        let err = map_sqlx_error("read_item", &item, sqlx::Error::PoolClosed);
        assert!(matches!(
            err,
            LedgerError::TransactionFailure { operation: "read_item", .. }
        ));
    }
}
