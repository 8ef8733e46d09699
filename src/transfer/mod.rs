//! Fund Transfer Workflow
//!
//! Moves money between two accounts of the same currency as one atomic unit.
//!
//! # State Machine
//!
//! ```text
//! STARTED → TRANSFER_RECORDED → DEBIT_ENTRY_RECORDED → CREDIT_ENTRY_RECORDED
//!         → SOURCE_DEBITED → DESTINATION_CREDITED → COMMITTED
//!    (any failure or panic) → ROLLED_BACK
//! ```
//!
//! # Invariants
//!
//! 1. **All-or-nothing**: the transfer row, both entries and both balance
//!    changes commit together or not at all
//! 2. **Zero-sum**: the two entries of a transfer sum to zero
//! 3. **Ordered locking**: both accounts are locked in ascending id order
//!    before any write
//! 4. **No dedup**: identical requests produce distinct transfers

pub mod error;
pub mod orchestrator;
pub mod state;
pub mod types;

pub use error::TransferError;
pub use orchestrator::TransferOrchestrator;
pub use state::{TransferState, TransferStep};
pub use types::{PostedTransfer, TransferPolicy, TransferRequest};
