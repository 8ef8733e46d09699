//! Ledger Store contract
//!
//! [`LedgerStore`] is the shared, pool-level handle. [`LedgerTx`] is one
//! all-or-nothing transaction scope, owned by exactly one request.
//!
//! Backends must guarantee:
//! 1. Writes issued through one `LedgerTx` are applied atomically on `commit`
//!    and discarded on `rollback` or drop.
//! 2. `adjust_balance` is a single read-modify-write (`balance = balance + delta`),
//!    so two transfers touching the same account never lose an update.
//! 3. `lock_account` holds the row until the transaction ends.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::StoreError;
use super::models::{Account, AccountChanges, Entry, NewAccount, NewEntry, NewTransfer, Page, Transfer};

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Open a transaction scope
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn list_accounts(&self, page: Page) -> Result<Vec<Account>, StoreError>;

    async fn get_account(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Update currency/owner. Returns `AccountNotFound` for an unknown id.
    async fn update_account(&self, id: i64, changes: AccountChanges)
    -> Result<Account, StoreError>;

    /// Returns `AccountNotFound` for an unknown id and `Reference` when
    /// entries or transfers still point at the account.
    async fn delete_account(&self, id: i64) -> Result<(), StoreError>;

    async fn get_transfer(&self, id: i64) -> Result<Option<Transfer>, StoreError>;

    /// Entries of one account, newest first
    async fn list_entries(&self, account_id: i64, page: Page) -> Result<Vec<Entry>, StoreError>;

    /// Both entries of one transfer, debit first
    async fn list_transfer_entries(&self, transfer_id: i64) -> Result<Vec<Entry>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// One transaction scope
#[async_trait]
pub trait LedgerTx: Send {
    /// Read an account and lock it for the rest of the transaction
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn create_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, StoreError>;

    async fn create_entry(&mut self, entry: NewEntry) -> Result<Entry, StoreError>;

    /// Apply a signed delta and return the new balance
    async fn adjust_balance(&mut self, account_id: i64, delta: Decimal)
    -> Result<Decimal, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
