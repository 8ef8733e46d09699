//! Ledger records: accounts, transfers and the entries that explain them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "USD")]
    pub currency: String,
    #[schema(example = "rahul")]
    pub owner: String,
    /// Signed; may go negative when overdraft is allowed
    #[schema(value_type = String, example = "24.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Recorded movement of `amount` from one account to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transfer {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub from_account_id: i64,
    #[schema(example = 2)]
    pub to_account_id: i64,
    #[schema(value_type = String, example = "20.00")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One signed ledger line. Negative for the debited account, positive for the credited one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub account_id: i64,
    #[schema(example = 1)]
    pub transfer_id: i64,
    #[schema(value_type = String, example = "-20.00")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative()
    }
}

/// Account creation input (already validated by the boundary)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub currency: String,
    pub owner: String,
    pub opening_balance: Decimal,
}

/// Field changes allowed on an existing account.
///
/// No balance field: balances only move through transfers.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub currency: Option<String>,
    pub owner: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.currency.is_none() && self.owner.is_none()
    }

    pub fn apply(&self, account: &mut Account) {
        if let Some(currency) = &self.currency {
            account.currency = currency.clone();
        }
        if let Some(owner) = &self.owner {
            account.owner = owner.clone();
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewTransfer {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct NewEntry {
    pub account_id: i64,
    pub transfer_id: i64,
    pub amount: Decimal,
}

impl NewEntry {
    /// Debit line for the source account of `transfer`
    pub fn debit(transfer: &Transfer) -> Self {
        Self {
            account_id: transfer.from_account_id,
            transfer_id: transfer.id,
            amount: -transfer.amount,
        }
    }

    /// Credit line for the destination account of `transfer`
    pub fn credit(transfer: &Transfer) -> Self {
        Self {
            account_id: transfer.to_account_id,
            transfer_id: transfer.id,
            amount: transfer.amount,
        }
    }
}

/// Exclusive bound on stored magnitudes: `NUMERIC(20, 4)` keeps 16 integer digits
pub const BALANCE_LIMIT: i64 = 10_000_000_000_000_000;

/// Offset pagination, `page_id` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page_id: i64,
    pub page_size: i64,
}

impl Page {
    pub fn new(page_id: i64, page_size: i64) -> Self {
        Self { page_id, page_size }
    }

    /// Saturates instead of overflowing for out-of-range page ids
    pub fn offset(&self) -> i64 {
        (self.page_id.max(1) - 1).saturating_mul(self.page_size.max(0))
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn transfer(amount: &str) -> Transfer {
        Transfer {
            id: 7,
            from_account_id: 1,
            to_account_id: 2,
            amount: Decimal::from_str(amount).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_pair_is_zero_sum() {
        let t = transfer("20.5");
        let debit = NewEntry::debit(&t);
        let credit = NewEntry::credit(&t);

        assert_eq!(debit.account_id, 1);
        assert_eq!(credit.account_id, 2);
        assert_eq!(debit.transfer_id, 7);
        assert_eq!(debit.amount + credit.amount, Decimal::ZERO);
        assert_eq!(credit.amount, t.amount);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(1, 5).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);
        assert_eq!(Page::new(3, 10).limit(), 10);
        assert_eq!(Page::new(i64::MAX, 10).offset(), i64::MAX);
    }

    #[test]
    fn test_account_changes_leave_balance_alone() {
        let mut account = Account {
            id: 1,
            currency: "USD".to_string(),
            owner: "rahul".to_string(),
            balance: Decimal::from(24),
            created_at: Utc::now(),
        };
        let changes = AccountChanges {
            currency: Some("EUR".to_string()),
            owner: None,
        };

        changes.apply(&mut account);
        assert_eq!(account.currency, "EUR");
        assert_eq!(account.owner, "rahul");
        assert_eq!(account.balance, Decimal::from(24));
        assert!(AccountChanges::default().is_empty());
    }
}
