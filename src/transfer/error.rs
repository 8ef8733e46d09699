//! Transfer Error Types

use rust_decimal::Decimal;
use thiserror::Error;

use super::state::TransferStep;
use crate::ledger::StoreError;

/// Outcome of a failed transfer. Every variant means the transaction was
/// rolled back (or never opened).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Source and destination accounts must differ")]
    SameAccount,

    #[error("Account {account_id} currency mismatch: {account_currency} vs {requested}")]
    CurrencyMismatch {
        account_id: i64,
        account_currency: String,
        requested: String,
    },

    // === Reference Errors ===
    #[error("Account {0} not found")]
    AccountNotFound(i64),

    // === Funds ===
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {amount}")]
    InsufficientFunds {
        account_id: i64,
        balance: Decimal,
        amount: Decimal,
    },

    // === Store Errors ===
    /// Reading the referenced accounts failed
    #[error("Error while loading accounts: {0}")]
    Lookup(StoreError),

    /// One of the five writes failed
    #[error("Error while {}: {source}", .step.describe())]
    Step {
        step: TransferStep,
        source: StoreError,
    },

    /// Begin/commit/rollback failed
    #[error("Transaction failure: {0}")]
    Transaction(StoreError),

    /// The workflow panicked and was rolled back
    #[error("Transfer aborted: {0}")]
    Aborted(String),
}

impl TransferError {
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            TransferError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            TransferError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TransferError::Lookup(e) | TransferError::Step { source: e, .. } => e.code(),
            TransferError::Transaction(e) => match e {
                StoreError::Conflict(_) => e.code(),
                _ => "TRANSACTION_ERROR",
            },
            TransferError::Aborted(_) => "TRANSFER_ABORTED",
        }
    }

    /// HTTP status suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount
            | TransferError::SameAccount
            | TransferError::CurrencyMismatch { .. }
            | TransferError::AccountNotFound(_)
            | TransferError::InsufficientFunds { .. } => 400,
            TransferError::Lookup(e) | TransferError::Step { source: e, .. } => e.http_status(),
            TransferError::Transaction(e) => match e {
                StoreError::Conflict(_) => 409,
                _ => 500,
            },
            TransferError::Aborted(_) => 500,
        }
    }

    /// The workflow step that failed, if the failure happened during the writes
    pub fn failed_step(&self) -> Option<TransferStep> {
        match self {
            TransferError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub(crate) fn at_step(step: TransferStep) -> impl FnOnce(StoreError) -> TransferError {
        move |source| match source {
            // A vanished account surfaces as a reference failure, not a store fault
            StoreError::AccountNotFound(id) => TransferError::AccountNotFound(id),
            source => TransferError::Step { step, source },
        }
    }
}
