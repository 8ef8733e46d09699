use std::sync::Arc;

use crate::ledger::LedgerStore;
use crate::transfer::{TransferOrchestrator, TransferPolicy};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Ledger store for account CRUD and reads
    pub store: Arc<dyn LedgerStore>,
    /// Transfer workflow over the same store
    pub orchestrator: Arc<TransferOrchestrator>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, policy: TransferPolicy) -> Self {
        let orchestrator = Arc::new(TransferOrchestrator::new(store.clone(), policy));
        Self {
            store,
            orchestrator,
        }
    }
}
