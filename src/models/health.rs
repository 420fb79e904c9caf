//! Backend health snapshot value.

use serde::{Deserialize, Serialize};

/// Point-in-time health of one backend, as reported by its status endpoint or
/// relayed by the leader replica.
///
/// The default value is `failing` so nothing is considered eligible before the
/// first successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub failing: bool,
    #[serde(default)]
    pub min_response_time: u32,
}

impl HealthStatus {
    pub const fn healthy(min_response_time: u32) -> Self {
        Self {
            failing: false,
            min_response_time,
        }
    }

    pub const fn failing() -> Self {
        Self {
            failing: true,
            min_response_time: 0,
        }
    }

    /// A 429 from the status endpoint proves the backend is reachable, but
    /// tells us nothing about latency.
    pub const fn rate_limited() -> Self {
        Self::healthy(0)
    }

    pub fn is_active(&self) -> bool {
        !self.failing
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::failing()
    }
}
