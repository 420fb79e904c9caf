//! Payment, task and committed-record types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{GatewayError, Result};

/// Which external backend handled (or should handle) a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessorRole {
    /// Cheaper, preferred backend
    Default,
    /// Costlier backup backend
    Fallback,
}

impl ProcessorRole {
    pub const ALL: [ProcessorRole; 2] = [ProcessorRole::Default, ProcessorRole::Fallback];

    /// Lowercase name used in URLs and configuration keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorRole::Default => "default",
            ProcessorRole::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ProcessorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorRole::Default => write!(f, "DEFAULT"),
            ProcessorRole::Fallback => write!(f, "FALLBACK"),
        }
    }
}

impl FromStr for ProcessorRole {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ProcessorRole::Default),
            "fallback" => Ok(ProcessorRole::Fallback),
            other => Err(GatewayError::validation(format!(
                "unknown processor '{other}'"
            ))),
        }
    }
}

/// Immutable payment value. `requested_at` is stamped once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    correlation_id: Uuid,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount: Decimal,
    requested_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(correlation_id: Uuid, amount: Decimal) -> Self {
        Self::with_requested_at(correlation_id, amount, Utc::now())
    }

    pub fn with_requested_at(
        correlation_id: Uuid,
        amount: Decimal,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            correlation_id,
            amount,
            requested_at,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

/// Inbound submission body. A missing correlation id is generated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub correlation_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

impl PaymentRequest {
    pub fn new(correlation_id: Option<Uuid>, amount: Decimal) -> Self {
        Self {
            correlation_id,
            amount,
        }
    }

    /// Validate the request and stamp it into a `Payment`
    pub fn into_payment(self) -> Result<Payment> {
        if self.amount <= Decimal::ZERO {
            return Err(GatewayError::validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        let correlation_id = self.correlation_id.unwrap_or_else(Uuid::new_v4);
        Ok(Payment::new(correlation_id, self.amount))
    }
}

/// A queued unit of work: one payment plus its wire body and retry count.
///
/// The body is serialized once at ingestion so retries resend identical bytes,
/// which keeps the backend's correlation-id dedupe meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTask {
    payment: Payment,
    body: String,
    retry_count: u32,
}

impl PaymentTask {
    pub fn new(payment: Payment) -> Result<Self> {
        let body = serde_json::to_string(&payment)?;
        Ok(Self {
            payment,
            body,
            retry_count: 0,
        })
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    pub fn correlation_id(&self) -> Uuid {
        self.payment.correlation_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Record that both backends failed for this task. Returns the new count.
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }
}

/// Shape handed to the persistence sink once per committed payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub correlation_id: Uuid,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub requested_at: DateTime<Utc>,
    pub processor_type: ProcessorRole,
}

impl PaymentRecord {
    pub fn committed(payment: &Payment, processor_type: ProcessorRole) -> Self {
        Self {
            correlation_id: payment.correlation_id,
            amount: payment.amount,
            requested_at: payment.requested_at,
            processor_type,
        }
    }
}
