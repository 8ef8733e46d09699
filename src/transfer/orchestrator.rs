//! Transfer Orchestrator
//!
//! Posts one transfer inside one transaction scope:
//!
//! 1. lock both accounts (ascending id), check existence, currency and funds
//! 2. insert the transfer row
//! 3. insert the debit entry, then the credit entry
//! 4. debit the source balance, then credit the destination balance
//! 5. commit
//!
//! The first failure rolls the whole scope back. A panic inside the workflow
//! is caught and rolled back the same way. Nothing is retried here.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::state::{TransferState, TransferStep};
use super::types::{PostedTransfer, TransferPolicy, TransferRequest};
use crate::ledger::{Account, LedgerStore, LedgerTx, NewEntry, NewTransfer};

pub struct TransferOrchestrator {
    store: Arc<dyn LedgerStore>,
    policy: TransferPolicy,
}

impl TransferOrchestrator {
    pub fn new(store: Arc<dyn LedgerStore>, policy: TransferPolicy) -> Self {
        Self { store, policy }
    }

    /// Post a transfer. On `Ok` all five writes are committed; on `Err`
    /// none of them are.
    pub async fn post_transfer(
        &self,
        req: TransferRequest,
    ) -> Result<PostedTransfer, TransferError> {
        // Same rules as the gateway, for callers that skip it
        if req.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        if req.from_account_id == req.to_account_id {
            return Err(TransferError::SameAccount);
        }

        info!(
            from = req.from_account_id,
            to = req.to_account_id,
            amount = %req.amount,
            currency = %req.currency,
            store = self.store.name(),
            "Posting transfer"
        );

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(TransferError::Transaction)?;

        let outcome = AssertUnwindSafe(self.apply(tx.as_mut(), &req))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(TransferError::Aborted(panic_message(panic.as_ref()))));

        match outcome {
            Ok(posted) => {
                if let Err(e) = tx.commit().await {
                    error!(
                        transfer_id = posted.transfer.id,
                        state = %TransferState::RolledBack,
                        error = %e,
                        "Commit failed"
                    );
                    return Err(TransferError::Transaction(e));
                }
                info!(
                    transfer_id = posted.transfer.id,
                    state = %TransferState::Committed,
                    from_balance = %posted.from_balance,
                    to_balance = %posted.to_balance,
                    "Transfer committed"
                );
                Ok(posted)
            }
            Err(e) => {
                warn!(
                    from = req.from_account_id,
                    to = req.to_account_id,
                    step = ?e.failed_step(),
                    code = e.code(),
                    error = %e,
                    "Transfer failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                    return Err(TransferError::Transaction(rollback_err));
                }
                debug!(state = %TransferState::RolledBack, "Transfer rolled back");
                Err(e)
            }
        }
    }

    /// Validation plus the five writes, all against `tx`
    async fn apply(
        &self,
        tx: &mut dyn LedgerTx,
        req: &TransferRequest,
    ) -> Result<PostedTransfer, TransferError> {
        let mut state = TransferState::Started;
        let (source, destination) = self.load_accounts(tx, req).await?;

        let step = TransferStep::RecordTransfer;
        let transfer = tx
            .create_transfer(NewTransfer {
                from_account_id: source.id,
                to_account_id: destination.id,
                amount: req.amount,
            })
            .await
            .map_err(TransferError::at_step(step))?;
        advance(&mut state, step, transfer.id)?;

        let step = TransferStep::RecordDebitEntry;
        let debit = tx
            .create_entry(NewEntry::debit(&transfer))
            .await
            .map_err(TransferError::at_step(step))?;
        advance(&mut state, step, transfer.id)?;

        let step = TransferStep::RecordCreditEntry;
        let credit = tx
            .create_entry(NewEntry::credit(&transfer))
            .await
            .map_err(TransferError::at_step(step))?;
        advance(&mut state, step, transfer.id)?;

        let step = TransferStep::DebitSource;
        let from_balance = tx
            .adjust_balance(source.id, -transfer.amount)
            .await
            .map_err(TransferError::at_step(step))?;
        advance(&mut state, step, transfer.id)?;

        let step = TransferStep::CreditDestination;
        let to_balance = tx
            .adjust_balance(destination.id, transfer.amount)
            .await
            .map_err(TransferError::at_step(step))?;
        advance(&mut state, step, transfer.id)?;

        Ok(PostedTransfer {
            transfer,
            debit,
            credit,
            from_balance,
            to_balance,
        })
    }

    /// Lock and check both accounts. Returns `(source, destination)`.
    async fn load_accounts(
        &self,
        tx: &mut dyn LedgerTx,
        req: &TransferRequest,
    ) -> Result<(Account, Account), TransferError> {
        // Lower id first: opposite transfers must not deadlock
        let source_first = req.from_account_id < req.to_account_id;
        let (first_id, second_id) = if source_first {
            (req.from_account_id, req.to_account_id)
        } else {
            (req.to_account_id, req.from_account_id)
        };

        let first = lock(tx, first_id).await?;
        let second = lock(tx, second_id).await?;
        let (source, destination) = if source_first {
            (first, second)
        } else {
            (second, first)
        };

        for account in [&source, &destination] {
            if account.currency != req.currency {
                return Err(TransferError::CurrencyMismatch {
                    account_id: account.id,
                    account_currency: account.currency.clone(),
                    requested: req.currency.clone(),
                });
            }
        }

        if !self.policy.allow_overdraft && source.balance < req.amount {
            return Err(TransferError::InsufficientFunds {
                account_id: source.id,
                balance: source.balance,
                amount: req.amount,
            });
        }

        Ok((source, destination))
    }
}

async fn lock(tx: &mut dyn LedgerTx, id: i64) -> Result<Account, TransferError> {
    tx.lock_account(id)
        .await
        .map_err(TransferError::Lookup)?
        .ok_or(TransferError::AccountNotFound(id))
}

fn advance(
    state: &mut TransferState,
    step: TransferStep,
    transfer_id: i64,
) -> Result<(), TransferError> {
    let next = state.advance(step).ok_or_else(|| {
        TransferError::Aborted(format!("{} attempted in state {}", step, state))
    })?;
    debug!(transfer_id, step = step.number(), state = %next, "Transfer step done");
    *state = next;
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during transfer".to_string()
    }
}
