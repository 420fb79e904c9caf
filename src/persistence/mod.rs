//! # Persistence
//!
//! Where committed payments go once a processor has accepted them, and the
//! reporting queries served over them.

pub mod in_memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Result;
use crate::models::{PaymentRecord, PaymentSummary};

pub use in_memory::InMemoryPaymentStore;

/// Receives one record per committed payment.
///
/// Implementations must treat a repeated `correlation_id` as already stored
/// rather than as an error.
#[async_trait]
pub trait PersistenceSink: Send + Sync + fmt::Debug {
    async fn record(&self, record: PaymentRecord) -> Result<()>;
}

/// Reporting side of the payment store
#[async_trait]
pub trait PaymentLedger: Send + Sync + fmt::Debug {
    /// Totals per processor over records with `from <= requested_at <= to`
    async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<PaymentSummary>;

    /// Remove every record, returning how many were removed
    async fn purge(&self) -> Result<usize>;
}
