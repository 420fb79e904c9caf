//! # Health Monitor
//!
//! Probes both processors on demand, never more often than the configured
//! rate-limit window per backend, and publishes the results as atomically
//! replaced snapshots.
//!
//! A probe round runs both due probes concurrently under one overall deadline.
//! If the round overruns or a probe task dies, both backends are marked failing
//! until a later round completes. Probes still in flight when a round ends are
//! aborted, so an abandoned round leaves no request behind.

use futures::future;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use super::snapshot::{AtomicHealthStatus, AtomicTimestamp};
use crate::config::HealthConfig;
use crate::gateway::ProcessorGateway;
use crate::models::{HealthStatus, ProcessorRole};

/// What a call to [`HealthMonitor::probe_round`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRoundOutcome {
    /// No backend was due; snapshots left as they were
    Skipped,
    /// Every issued probe returned; `probed` snapshots were replaced
    Completed { probed: usize },
    /// The round overran its deadline
    TimedOut,
    /// A probe task panicked or was cancelled
    Failed,
}

#[derive(Debug, Default)]
pub struct HealthMonitorStats {
    pub rounds_completed: AtomicU64,
    pub rounds_abandoned: AtomicU64,
    pub default_probes: AtomicU64,
    pub fallback_probes: AtomicU64,
}

/// Point-in-time copy of [`HealthMonitorStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMonitorStatsSnapshot {
    pub rounds_completed: u64,
    pub rounds_abandoned: u64,
    pub default_probes: u64,
    pub fallback_probes: u64,
}

impl HealthMonitorStats {
    pub fn snapshot(&self) -> HealthMonitorStatsSnapshot {
        HealthMonitorStatsSnapshot {
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
            rounds_abandoned: self.rounds_abandoned.load(Ordering::Relaxed),
            default_probes: self.default_probes.load(Ordering::Relaxed),
            fallback_probes: self.fallback_probes.load(Ordering::Relaxed),
        }
    }

    fn probes(&self, role: ProcessorRole) -> &AtomicU64 {
        match role {
            ProcessorRole::Default => &self.default_probes,
            ProcessorRole::Fallback => &self.fallback_probes,
        }
    }
}

#[derive(Debug)]
struct BackendSlot {
    gateway: Arc<dyn ProcessorGateway>,
    status: AtomicHealthStatus,
    probed_at: AtomicTimestamp,
}

impl BackendSlot {
    fn new(gateway: Arc<dyn ProcessorGateway>) -> Self {
        Self {
            gateway,
            status: AtomicHealthStatus::default(),
            probed_at: AtomicTimestamp::never(),
        }
    }

    /// Spawn a probe if the rate-limit window allows one
    fn claim_probe(&self, window: Duration) -> Option<JoinHandle<HealthStatus>> {
        if !self.probed_at.try_claim(window) {
            return None;
        }
        let gateway = Arc::clone(&self.gateway);
        Some(tokio::spawn(async move { gateway.probe_health().await }))
    }
}

/// Probe tasks issued by one round
struct RoundProbes {
    default: Option<JoinHandle<HealthStatus>>,
    fallback: Option<JoinHandle<HealthStatus>>,
}

impl RoundProbes {
    fn is_empty(&self) -> bool {
        self.default.is_none() && self.fallback.is_none()
    }
}

impl Drop for RoundProbes {
    fn drop(&mut self) {
        for handle in [&self.default, &self.fallback].into_iter().flatten() {
            handle.abort();
        }
    }
}

async fn await_probe(
    handle: &mut Option<JoinHandle<HealthStatus>>,
) -> Result<Option<HealthStatus>, JoinError> {
    match handle {
        Some(handle) => handle.await.map(Some),
        None => Ok(None),
    }
}

#[derive(Debug)]
pub struct HealthMonitor {
    default: BackendSlot,
    fallback: BackendSlot,
    rate_limit_window: Duration,
    round_timeout: Duration,
    stats: HealthMonitorStats,
}

impl HealthMonitor {
    pub fn new(
        default_gateway: Arc<dyn ProcessorGateway>,
        fallback_gateway: Arc<dyn ProcessorGateway>,
        config: &HealthConfig,
    ) -> Self {
        Self {
            default: BackendSlot::new(default_gateway),
            fallback: BackendSlot::new(fallback_gateway),
            rate_limit_window: config.rate_limit_window(),
            round_timeout: config.round_timeout(),
            stats: HealthMonitorStats::default(),
        }
    }

    fn slot(&self, role: ProcessorRole) -> &BackendSlot {
        match role {
            ProcessorRole::Default => &self.default,
            ProcessorRole::Fallback => &self.fallback,
        }
    }

    /// `true` when the latest snapshot for `role` is not failing
    pub fn is_active(&self, role: ProcessorRole) -> bool {
        self.snapshot(role).is_active()
    }

    pub fn snapshot(&self, role: ProcessorRole) -> HealthStatus {
        self.slot(role).status.load()
    }

    pub fn stats(&self) -> &HealthMonitorStats {
        &self.stats
    }

    pub fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }

    /// Run one probe round against every backend whose window has elapsed
    pub async fn probe_round(&self) -> ProbeRoundOutcome {
        let window = self.rate_limit_window;
        // dropping this aborts any probe the round stops waiting for
        let mut probes = RoundProbes {
            default: self.default.claim_probe(window),
            fallback: self.fallback.claim_probe(window),
        };

        if probes.is_empty() {
            debug!("No backend due for a health probe");
            return ProbeRoundOutcome::Skipped;
        }
        for (role, probe) in [
            (ProcessorRole::Default, &probes.default),
            (ProcessorRole::Fallback, &probes.fallback),
        ] {
            if probe.is_some() {
                self.stats.probes(role).fetch_add(1, Ordering::Relaxed);
            }
        }

        let round = future::join(
            await_probe(&mut probes.default),
            await_probe(&mut probes.fallback),
        );
        let result = tokio::time::timeout(self.round_timeout, round).await;
        match result {
            Ok((Ok(default_status), Ok(fallback_status))) => {
                let mut probed = 0;
                for (role, status) in [
                    (ProcessorRole::Default, default_status),
                    (ProcessorRole::Fallback, fallback_status),
                ] {
                    if let Some(status) = status {
                        self.publish(role, status);
                        probed += 1;
                    }
                }
                self.stats.rounds_completed.fetch_add(1, Ordering::Relaxed);
                ProbeRoundOutcome::Completed { probed }
            }
            Ok((default_result, fallback_result)) => {
                let join_error = default_result.err().or(fallback_result.err());
                error!(
                    error = ?join_error,
                    "❌ Health probe task failed; marking both processors failing"
                );
                self.fail_conservatively();
                ProbeRoundOutcome::Failed
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.round_timeout.as_millis() as u64,
                    "⏰ Health probe round timed out; marking both processors failing"
                );
                drop(probes);
                self.fail_conservatively();
                ProbeRoundOutcome::TimedOut
            }
        }
    }

    fn publish(&self, role: ProcessorRole, status: HealthStatus) {
        let previous = self.slot(role).status.swap(status);
        if previous.failing != status.failing {
            info!(
                processor = %role,
                failing = status.failing,
                min_response_time = status.min_response_time,
                "🩺 Processor health changed"
            );
        }
    }

    fn fail_conservatively(&self) {
        for role in ProcessorRole::ALL {
            self.slot(role).status.store(HealthStatus::failing());
        }
        self.stats.rounds_abandoned.fetch_add(1, Ordering::Relaxed);
    }
}
