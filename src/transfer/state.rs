//! Transfer workflow states and steps
//!
//! The state machine is per request and lives only in memory:
//!
//! ```text
//! STARTED → TRANSFER_RECORDED → DEBIT_ENTRY_RECORDED → CREDIT_ENTRY_RECORDED
//!         → SOURCE_DEBITED → DESTINATION_CREDITED → COMMITTED
//!    (any non-terminal state) → ROLLED_BACK
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Transaction open, accounts validated, nothing written yet
    Started,
    TransferRecorded,
    DebitEntryRecorded,
    CreditEntryRecorded,
    SourceDebited,
    DestinationCredited,
    /// Terminal: all five writes committed
    Committed,
    /// Terminal: nothing from this request persisted
    RolledBack,
}

impl TransferState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::RolledBack)
    }

    /// The next write to perform from this state, if any
    pub fn pending_step(&self) -> Option<TransferStep> {
        match self {
            TransferState::Started => Some(TransferStep::RecordTransfer),
            TransferState::TransferRecorded => Some(TransferStep::RecordDebitEntry),
            TransferState::DebitEntryRecorded => Some(TransferStep::RecordCreditEntry),
            TransferState::CreditEntryRecorded => Some(TransferStep::DebitSource),
            TransferState::SourceDebited => Some(TransferStep::CreditDestination),
            TransferState::DestinationCredited
            | TransferState::Committed
            | TransferState::RolledBack => None,
        }
    }

    /// Transition after `step` succeeded. Returns `None` if `step` is not the
    /// pending one.
    pub fn advance(self, step: TransferStep) -> Option<TransferState> {
        (self.pending_step() == Some(step)).then(|| step.reaches())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Started => "STARTED",
            TransferState::TransferRecorded => "TRANSFER_RECORDED",
            TransferState::DebitEntryRecorded => "DEBIT_ENTRY_RECORDED",
            TransferState::CreditEntryRecorded => "CREDIT_ENTRY_RECORDED",
            TransferState::SourceDebited => "SOURCE_DEBITED",
            TransferState::DestinationCredited => "DESTINATION_CREDITED",
            TransferState::Committed => "COMMITTED",
            TransferState::RolledBack => "ROLLED_BACK",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five writes of a transfer, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStep {
    RecordTransfer,
    RecordDebitEntry,
    RecordCreditEntry,
    DebitSource,
    CreditDestination,
}

impl TransferStep {
    pub const ALL: [TransferStep; 5] = [
        TransferStep::RecordTransfer,
        TransferStep::RecordDebitEntry,
        TransferStep::RecordCreditEntry,
        TransferStep::DebitSource,
        TransferStep::CreditDestination,
    ];

    /// 1-based position in the workflow
    pub fn number(&self) -> u8 {
        match self {
            TransferStep::RecordTransfer => 1,
            TransferStep::RecordDebitEntry => 2,
            TransferStep::RecordCreditEntry => 3,
            TransferStep::DebitSource => 4,
            TransferStep::CreditDestination => 5,
        }
    }

    pub fn reaches(&self) -> TransferState {
        match self {
            TransferStep::RecordTransfer => TransferState::TransferRecorded,
            TransferStep::RecordDebitEntry => TransferState::DebitEntryRecorded,
            TransferStep::RecordCreditEntry => TransferState::CreditEntryRecorded,
            TransferStep::DebitSource => TransferState::SourceDebited,
            TransferStep::CreditDestination => TransferState::DestinationCredited,
        }
    }

    /// Human-readable action, used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TransferStep::RecordTransfer => "saving transfer",
            TransferStep::RecordDebitEntry => "saving entry for debited account",
            TransferStep::RecordCreditEntry => "saving entry for credited account",
            TransferStep::DebitSource => "decrementing balance of sender account",
            TransferStep::CreditDestination => "incrementing balance of receiver account",
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Committed.is_terminal());
        assert!(TransferState::RolledBack.is_terminal());

        assert!(!TransferState::Started.is_terminal());
        assert!(!TransferState::SourceDebited.is_terminal());
        assert!(!TransferState::DestinationCredited.is_terminal());
    }

    #[test]
    fn test_steps_walk_the_happy_path() {
        let mut state = TransferState::Started;
        for step in TransferStep::ALL {
            state = state.advance(step).expect("step should be pending");
        }
        assert_eq!(state, TransferState::DestinationCredited);
        assert_eq!(state.pending_step(), None);
    }

    #[test]
    fn test_out_of_order_step_is_rejected() {
        assert_eq!(
            TransferState::Started.advance(TransferStep::DebitSource),
            None
        );
        assert_eq!(
            TransferState::Committed.advance(TransferStep::RecordTransfer),
            None
        );
    }

    #[test]
    fn test_step_numbers_follow_order() {
        let numbers: Vec<u8> = TransferStep::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferState::Started.to_string(), "STARTED");
        assert_eq!(TransferState::RolledBack.to_string(), "ROLLED_BACK");
        assert_eq!(
            TransferStep::DebitSource.to_string(),
            "step 4 (decrementing balance of sender account)"
        );
    }
}
