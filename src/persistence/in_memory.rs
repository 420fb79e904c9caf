use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::{PaymentLedger, PersistenceSink};
use crate::error::Result;
use crate::models::{PaymentRecord, PaymentSummary};

/// Committed payments keyed by correlation id; the first record for an id wins
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    records: DashMap<Uuid, PaymentRecord>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, correlation_id: &Uuid) -> Option<PaymentRecord> {
        self.records.get(correlation_id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl PersistenceSink for InMemoryPaymentStore {
    async fn record(&self, record: PaymentRecord) -> Result<()> {
        match self.records.entry(record.correlation_id) {
            Entry::Occupied(existing) => {
                debug!(
                    correlation_id = %record.correlation_id,
                    stored_processor = %existing.get().processor_type,
                    "Payment already recorded; ignoring duplicate"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentStore {
    async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<PaymentSummary> {
        let from = from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let to = to.unwrap_or_else(Utc::now);

        let mut summary = PaymentSummary::default();
        for entry in self.records.iter() {
            let record = entry.value();
            if record.requested_at >= from && record.requested_at <= to {
                summary.add(record);
            }
        }
        Ok(summary)
    }

    async fn purge(&self) -> Result<usize> {
        let removed = self.records.len();
        self.records.clear();
        info!(removed, "🧹 Purged committed payments");
        Ok(removed)
    }
}
