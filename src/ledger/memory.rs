//! In-memory Ledger Store
//!
//! Used when no PostgreSQL URL is configured and as the substitute store in
//! tests. A transaction takes the store-wide async lock for its whole
//! lifetime and stages writes on a working copy, so transactions are fully
//! serialised and a rollback (or drop) simply discards the copy. Readers
//! wait for the open transaction to finish.
//!
//! Faults can be injected per operation to exercise rollback paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::error::StoreError;
use super::models::{
    Account, AccountChanges, BALANCE_LIMIT, Entry, NewAccount, NewEntry, NewTransfer, Page,
    Transfer,
};
use super::store::{LedgerStore, LedgerTx};

/// Transaction-scoped operations that can carry an injected fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    LockAccount,
    CreateTransfer,
    CreateEntry,
    AdjustBalance,
    Commit,
}

#[derive(Debug, Clone)]
pub enum Fault {
    Fail(StoreError),
    Panic,
}

/// Committed write, in the order it was issued
#[derive(Debug, Clone, PartialEq)]
pub enum JournalRecord {
    Transfer { transfer_id: i64 },
    Entry { entry_id: i64, transfer_id: i64 },
    Balance { account_id: i64, delta: Decimal },
}

#[derive(Debug, Clone)]
struct InjectedFault {
    op: StoreOp,
    /// 1-based occurrence of `op` within a single transaction
    occurrence: usize,
    fault: Fault,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: BTreeMap<i64, Account>,
    transfers: BTreeMap<i64, Transfer>,
    entries: BTreeMap<i64, Entry>,
    last_account_id: i64,
    last_transfer_id: i64,
    last_entry_id: i64,
    journal: Vec<JournalRecord>,
}

impl MemoryState {
    fn account_exists(&self, id: i64) -> bool {
        self.accounts.contains_key(&id)
    }

    fn is_referenced(&self, account_id: i64) -> bool {
        self.entries.values().any(|e| e.account_id == account_id)
            || self
                .transfers
                .values()
                .any(|t| t.from_account_id == account_id || t.to_account_id == account_id)
    }
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    state: Arc<AsyncMutex<MemoryState>>,
    faults: Arc<Mutex<Vec<InjectedFault>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `fault` for the `occurrence`-th call of `op` inside the next
    /// transaction that reaches it. Each armed fault fires once.
    pub fn inject(&self, op: StoreOp, occurrence: usize, fault: Fault) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(InjectedFault {
                op,
                occurrence,
                fault,
            });
    }

    /// Committed writes in issue order
    pub async fn journal(&self) -> Vec<JournalRecord> {
        self.state.lock().await.journal.clone()
    }

    pub async fn transfers(&self) -> Vec<Transfer> {
        self.state.lock().await.transfers.values().cloned().collect()
    }

    pub async fn entries(&self) -> Vec<Entry> {
        self.state.lock().await.entries.values().cloned().collect()
    }

    /// Sum of all balances
    pub async fn total_balance(&self) -> Decimal {
        self.state
            .lock()
            .await
            .accounts
            .values()
            .map(|a| a.balance)
            .sum()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryLedgerTx {
            guard,
            work,
            faults: self.faults.clone(),
            seen: HashMap::new(),
        }))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        if account.opening_balance.abs() >= Decimal::from(BALANCE_LIMIT) {
            return Err(StoreError::Constraint(
                "opening balance out of range".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        state.last_account_id += 1;
        let created = Account {
            id: state.last_account_id,
            currency: account.currency,
            owner: account.owner,
            balance: account.opening_balance,
            created_at: Utc::now(),
        };
        state.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_accounts(&self, page: Page) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .skip(page.offset().max(0) as usize)
            .take(page.limit().max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound(id))?;
        changes.apply(account);
        Ok(account.clone())
    }

    async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.account_exists(id) {
            return Err(StoreError::AccountNotFound(id));
        }
        if state.is_referenced(id) {
            return Err(StoreError::Reference(format!(
                "account {} is still referenced by the ledger",
                id
            )));
        }
        state.accounts.remove(&id);
        Ok(())
    }

    async fn get_transfer(&self, id: i64) -> Result<Option<Transfer>, StoreError> {
        Ok(self.state.lock().await.transfers.get(&id).cloned())
    }

    async fn list_entries(&self, account_id: i64, page: Page) -> Result<Vec<Entry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .values()
            .rev()
            .filter(|e| e.account_id == account_id)
            .skip(page.offset().max(0) as usize)
            .take(page.limit().max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_transfer_entries(&self, transfer_id: i64) -> Result<Vec<Entry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .values()
            .filter(|e| e.transfer_id == transfer_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryLedgerTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
    faults: Arc<Mutex<Vec<InjectedFault>>>,
    seen: HashMap<StoreOp, usize>,
}

impl MemoryLedgerTx {
    fn checkpoint(&mut self, op: StoreOp) -> Result<(), StoreError> {
        let count = self.seen.entry(op).or_default();
        *count += 1;
        let occurrence = *count;

        // Release the fault list before a panic so it is never poisoned
        let fault = {
            let mut faults = self.faults.lock().unwrap_or_else(PoisonError::into_inner);
            faults
                .iter()
                .position(|f| f.op == op && f.occurrence == occurrence)
                .map(|i| faults.remove(i).fault)
        };

        match fault {
            None => Ok(()),
            Some(Fault::Fail(e)) => {
                tracing::debug!(?op, occurrence, error = %e, "Injected store failure");
                Err(e)
            }
            Some(Fault::Panic) => panic!("injected panic on {:?} #{}", op, occurrence),
        }
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        self.checkpoint(StoreOp::LockAccount)?;
        Ok(self.work.accounts.get(&id).cloned())
    }

    async fn create_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, StoreError> {
        self.checkpoint(StoreOp::CreateTransfer)?;
        for id in [transfer.from_account_id, transfer.to_account_id] {
            if !self.work.account_exists(id) {
                return Err(StoreError::Reference(format!("account {} does not exist", id)));
            }
        }
        if transfer.amount <= Decimal::ZERO {
            return Err(StoreError::Constraint(
                "transfer amount must be positive".to_string(),
            ));
        }

        self.work.last_transfer_id += 1;
        let created = Transfer {
            id: self.work.last_transfer_id,
            from_account_id: transfer.from_account_id,
            to_account_id: transfer.to_account_id,
            amount: transfer.amount,
            created_at: Utc::now(),
        };
        self.work.transfers.insert(created.id, created.clone());
        self.work.journal.push(JournalRecord::Transfer {
            transfer_id: created.id,
        });
        Ok(created)
    }

    async fn create_entry(&mut self, entry: NewEntry) -> Result<Entry, StoreError> {
        self.checkpoint(StoreOp::CreateEntry)?;
        if !self.work.account_exists(entry.account_id) {
            return Err(StoreError::Reference(format!(
                "account {} does not exist",
                entry.account_id
            )));
        }
        if !self.work.transfers.contains_key(&entry.transfer_id) {
            return Err(StoreError::Reference(format!(
                "transfer {} does not exist",
                entry.transfer_id
            )));
        }

        self.work.last_entry_id += 1;
        let created = Entry {
            id: self.work.last_entry_id,
            account_id: entry.account_id,
            transfer_id: entry.transfer_id,
            amount: entry.amount,
            created_at: Utc::now(),
        };
        self.work.entries.insert(created.id, created.clone());
        self.work.journal.push(JournalRecord::Entry {
            entry_id: created.id,
            transfer_id: created.transfer_id,
        });
        Ok(created)
    }

    async fn adjust_balance(
        &mut self,
        account_id: i64,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        self.checkpoint(StoreOp::AdjustBalance)?;
        let account = self
            .work
            .accounts
            .get_mut(&account_id)
            .ok_or(StoreError::AccountNotFound(account_id))?;
        let balance = account
            .balance
            .checked_add(delta)
            .filter(|b| b.abs() < Decimal::from(BALANCE_LIMIT))
            .ok_or_else(|| {
                StoreError::Constraint(format!("balance of account {} out of range", account_id))
            })?;
        account.balance = balance;
        self.work
            .journal
            .push(JournalRecord::Balance { account_id, delta });
        Ok(balance)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut tx = self;
        tx.checkpoint(StoreOp::Commit)?;
        let MemoryLedgerTx {
            mut guard, work, ..
        } = *tx;
        *guard = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(store: &MemoryLedgerStore, balance: i64) -> Account {
        store
            .create_account(NewAccount {
                currency: "USD".to_string(),
                owner: "rahul".to_string(),
                opening_balance: Decimal::from(balance),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = MemoryLedgerStore::new();
        assert_eq!(open(&store, 0).await.id, 1);
        assert_eq!(open(&store, 0).await.id, 2);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryLedgerStore::new();
        let a = open(&store, 24).await;
        let b = open(&store, 10).await;

        let mut tx = store.begin().await.unwrap();
        let t = tx
            .create_transfer(NewTransfer {
                from_account_id: a.id,
                to_account_id: b.id,
                amount: Decimal::from(20),
            })
            .await
            .unwrap();
        tx.create_entry(NewEntry::debit(&t)).await.unwrap();
        assert_eq!(
            tx.adjust_balance(a.id, Decimal::from(-20)).await.unwrap(),
            Decimal::from(4)
        );
        tx.commit().await.unwrap();

        assert_eq!(store.transfers().await.len(), 1);
        assert_eq!(store.entries().await.len(), 1);
        let a = store.get_account(a.id).await.unwrap().unwrap();
        assert_eq!(a.balance, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_rollback_and_drop_discard_writes() {
        let store = MemoryLedgerStore::new();
        let a = open(&store, 24).await;

        let mut tx = store.begin().await.unwrap();
        tx.adjust_balance(a.id, Decimal::from(-20)).await.unwrap();
        tx.rollback().await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.adjust_balance(a.id, Decimal::from(-5)).await.unwrap();
        }

        let a = store.get_account(a.id).await.unwrap().unwrap();
        assert_eq!(a.balance, Decimal::from(24));
        assert!(store.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_fault_fires_once() {
        let store = MemoryLedgerStore::new();
        let a = open(&store, 1).await;
        store.inject(
            StoreOp::AdjustBalance,
            2,
            Fault::Fail(StoreError::Database("boom".into())),
        );

        let mut tx = store.begin().await.unwrap();
        assert!(tx.adjust_balance(a.id, Decimal::ONE).await.is_ok());
        assert_eq!(
            tx.adjust_balance(a.id, Decimal::ONE).await,
            Err(StoreError::Database("boom".into()))
        );
        assert!(tx.adjust_balance(a.id, Decimal::ONE).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_referenced_account_is_rejected() {
        let store = MemoryLedgerStore::new();
        let a = open(&store, 5).await;
        let b = open(&store, 5).await;

        let mut tx = store.begin().await.unwrap();
        tx.create_transfer(NewTransfer {
            from_account_id: a.id,
            to_account_id: b.id,
            amount: Decimal::ONE,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(
            store.delete_account(a.id).await,
            Err(StoreError::Reference(_))
        ));
        assert_eq!(
            store.delete_account(99).await,
            Err(StoreError::AccountNotFound(99))
        );
    }

    #[tokio::test]
    async fn test_unknown_references_are_rejected() {
        let store = MemoryLedgerStore::new();
        let a = open(&store, 5).await;

        let mut tx = store.begin().await.unwrap();
        let result = tx
            .create_transfer(NewTransfer {
                from_account_id: a.id,
                to_account_id: 42,
                amount: Decimal::ONE,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Reference(_))));
        assert_eq!(
            tx.adjust_balance(42, Decimal::ONE).await,
            Err(StoreError::AccountNotFound(42))
        );
    }

    #[tokio::test]
    async fn test_balance_overflow_is_a_constraint_failure() {
        let store = MemoryLedgerStore::new();
        let near_limit = Decimal::from(BALANCE_LIMIT) - Decimal::new(1, 4);
        let a = store
            .create_account(NewAccount {
                currency: "USD".to_string(),
                owner: "rahul".to_string(),
                opening_balance: near_limit,
            })
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let result = tx.adjust_balance(a.id, Decimal::ONE).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
        let result = tx.adjust_balance(a.id, Decimal::MAX).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
        tx.rollback().await.unwrap();

        let a = store.get_account(a.id).await.unwrap().unwrap();
        assert_eq!(a.balance, near_limit);

        let result = store
            .create_account(NewAccount {
                currency: "USD".to_string(),
                owner: "rahul".to_string(),
                opening_balance: Decimal::MAX,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_accounts_pages() {
        let store = MemoryLedgerStore::new();
        for _ in 0..7 {
            open(&store, 0).await;
        }

        let first = store.list_accounts(Page::new(1, 5)).await.unwrap();
        let second = store.list_accounts(Page::new(2, 5)).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(second.iter().map(|a| a.id).collect::<Vec<_>>(), vec![6, 7]);

        let far = store.list_accounts(Page::new(i64::MAX, 10)).await.unwrap();
        assert!(far.is_empty());
    }
}
