//! Ledger store errors
//!
//! Every backend maps its native failures onto this taxonomy so the transfer
//! workflow and the gateway can decide outcomes without knowing the backend.

use thiserror::Error;

/// PostgreSQL SQLSTATE codes we classify explicitly
mod sqlstate {
    pub const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Account {0} not found")]
    AccountNotFound(i64),

    #[error("Transfer {0} not found")]
    TransferNotFound(i64),

    /// Foreign-key style failure: a referenced row does not exist or is still referenced
    #[error("Reference violation: {0}")]
    Reference(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Serialization failure or deadlock detected by the store
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// Begin/commit/rollback failed
    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Failure injected by the in-memory store
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            StoreError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            StoreError::Reference(_) => "REFERENCE_VIOLATION",
            StoreError::Constraint(_) => "CONSTRAINT_VIOLATION",
            StoreError::Conflict(_) => "CONCURRENCY_CONFLICT",
            StoreError::Transaction(_) => "TRANSACTION_ERROR",
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Injected(_) => "STORE_FAILURE",
        }
    }

    /// Caller-side problems (bad reference, violated constraint) map to 400,
    /// conflicts to 409, everything else is a server fault.
    pub fn http_status(&self) -> u16 {
        match self {
            StoreError::AccountNotFound(_)
            | StoreError::TransferNotFound(_)
            | StoreError::Reference(_)
            | StoreError::Constraint(_) => 400,
            StoreError::Conflict(_) => 409,
            StoreError::Transaction(_) | StoreError::Database(_) | StoreError::Injected(_) => 500,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some(sqlstate::FOREIGN_KEY_VIOLATION) => return StoreError::Reference(message),
                Some(sqlstate::NUMERIC_VALUE_OUT_OF_RANGE)
                | Some(sqlstate::NOT_NULL_VIOLATION)
                | Some(sqlstate::UNIQUE_VIOLATION)
                | Some(sqlstate::CHECK_VIOLATION) => return StoreError::Constraint(message),
                Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
                    return StoreError::Conflict(message);
                }
                _ => {}
            }
        }
        StoreError::Database(e.to_string())
    }
}
