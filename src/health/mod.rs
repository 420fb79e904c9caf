//! # Backend Health
//!
//! Rate-limited probing of both processors and the atomically readable
//! snapshots that workers consult on every dispatch.

pub mod monitor;
pub mod snapshot;

pub use monitor::{
    HealthMonitor, HealthMonitorStats, HealthMonitorStatsSnapshot, ProbeRoundOutcome,
};
pub use snapshot::{AtomicHealthStatus, AtomicTimestamp};
