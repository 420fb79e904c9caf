//! # Dispatch Models
//!
//! Value types that flow through the dispatch engine: the immutable payment,
//! the retryable task wrapping it, backend health snapshots, and the records
//! handed to persistence once a backend has accepted a payment.

pub mod health;
pub mod payment;
pub mod summary;

pub use health::HealthStatus;
pub use payment::{Payment, PaymentRecord, PaymentRequest, PaymentTask, ProcessorRole};
pub use summary::{PaymentSummary, SummaryDetails};
