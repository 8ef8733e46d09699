//! Fund Transfer - double-entry transfers between accounts
//!
//! # Modules
//!
//! - [`ledger`] - Accounts, transfers, entries and the transactional store
//! - [`transfer`] - Transfer orchestrator (validate, five writes, commit/rollback)
//! - [`account`] - Currency and owner validation
//! - [`gateway`] - HTTP API, response envelope and OpenAPI docs
//! - [`db`] - PostgreSQL pool and migrations
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use ledger::{
    Account, Entry, LedgerStore, LedgerTx, MemoryLedgerStore, PgLedgerStore, StoreError, Transfer,
};
pub use transfer::{
    PostedTransfer, TransferError, TransferOrchestrator, TransferPolicy, TransferRequest,
};
