//! Transfer request/outcome types

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::TransferConfig;
use crate::ledger::{Entry, Transfer};

/// Transfer command, already shape-validated by the boundary
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: Decimal,
    /// Both accounts must hold this currency
    pub currency: String,
}

impl TransferRequest {
    pub fn new(
        from_account_id: i64,
        to_account_id: i64,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            currency: currency.into(),
        }
    }
}

/// Committed transfer with its entry pair and the resulting balances
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PostedTransfer {
    pub transfer: Transfer,
    pub debit: Entry,
    pub credit: Entry,
    #[schema(value_type = String, example = "4.00")]
    pub from_balance: Decimal,
    #[schema(value_type = String, example = "30.00")]
    pub to_balance: Decimal,
}

/// Business rules applied before any write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Let the source balance go below zero
    pub allow_overdraft: bool,
}

impl From<&TransferConfig> for TransferPolicy {
    fn from(config: &TransferConfig) -> Self {
        Self {
            allow_overdraft: config.allow_overdraft,
        }
    }
}
