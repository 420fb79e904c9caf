//! Reporting aggregates over committed payments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{PaymentRecord, ProcessorRole};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetails {
    pub total_requests: u64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
}

/// Per-processor totals, keyed `default` / `fallback` on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    #[serde(rename = "default")]
    pub default_processor: SummaryDetails,
    #[serde(rename = "fallback")]
    pub fallback_processor: SummaryDetails,
}

impl PaymentSummary {
    pub fn add(&mut self, record: &PaymentRecord) {
        let details = match record.processor_type {
            ProcessorRole::Default => &mut self.default_processor,
            ProcessorRole::Fallback => &mut self.fallback_processor,
        };
        details.total_requests += 1;
        details.total_amount += record.amount;
    }
}
