//! # Web Application State
//!
//! Shared state handed to every handler.

use std::sync::Arc;

use crate::persistence::PaymentLedger;
use crate::services::DispatchService;

#[derive(Debug, Clone)]
pub struct AppState {
    dispatch: DispatchService,
    ledger: Arc<dyn PaymentLedger>,
}

impl AppState {
    pub fn new(dispatch: DispatchService, ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { dispatch, ledger }
    }

    pub fn dispatch(&self) -> &DispatchService {
        &self.dispatch
    }

    pub fn ledger(&self) -> &Arc<dyn PaymentLedger> {
        &self.ledger
    }
}
