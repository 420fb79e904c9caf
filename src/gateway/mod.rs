//! # Processor Gateway
//!
//! Capability boundary for one external payment processor. Two instances exist
//! at runtime, one per [`ProcessorRole`]. Implementations hold no per-call
//! mutable state and are shared by every worker.
//!
//! Nothing crosses this boundary as an error: transport failures, timeouts and
//! unexpected responses are folded into [`SubmitOutcome::Rejected`] or a
//! failing [`HealthStatus`].

pub mod http;

use async_trait::async_trait;
use std::fmt;

use crate::models::{HealthStatus, ProcessorRole};

pub use http::HttpProcessorGateway;

/// Classified result of submitting one payment body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// Backend already holds this correlation id; as good as `Accepted`
    DuplicateAccepted,
    Rejected,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted | SubmitOutcome::DuplicateAccepted)
    }
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitOutcome::Accepted => write!(f, "accepted"),
            SubmitOutcome::DuplicateAccepted => write!(f, "duplicate_accepted"),
            SubmitOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

#[async_trait]
pub trait ProcessorGateway: Send + Sync + fmt::Debug {
    /// Which backend this gateway talks to; dispatch checks eligibility and
    /// tags committed records by it
    fn role(&self) -> ProcessorRole;

    /// Submit a pre-serialized payment body
    async fn submit(&self, body: &str) -> SubmitOutcome;

    /// Issue one status request; never fails past this boundary
    async fn probe_health(&self) -> HealthStatus;
}
