//! Ledger Store
//!
//! Transactional persistence for accounts, transfers and entries.
//!
//! - [`LedgerStore`] / [`LedgerTx`]: the storage contract
//! - [`PgLedgerStore`]: PostgreSQL backend (canonical)
//! - [`MemoryLedgerStore`]: in-process backend with fault injection

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryLedgerStore;
pub use models::{Account, AccountChanges, Entry, NewAccount, NewEntry, NewTransfer, Page, Transfer};
pub use postgres::PgLedgerStore;
pub use store::{LedgerStore, LedgerTx};
