//! # Leader Coordinator
//!
//! Decides where this replica's view of processor health comes from:
//!
//! - `DesignatedLeader` / `FailoverLeader`: the local [`HealthMonitor`], which
//!   probes the processors directly.
//! - `Follower`: the leader's internal health surface, read through a
//!   [`PeerHealthClient`]. A follower that has gone longer than the failover
//!   timeout without one successful read promotes itself to `FailoverLeader`
//!   and probes from then on.
//!
//! Workers only ever call [`LeaderCoordinator::is_backend_active`], which is a
//! pair of atomic loads.

use futures::future;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::peer_client::PeerHealthClient;
use super::role::{AtomicReplicaRole, ReplicaRole};
use crate::config::{ConfigurationError, HealthConfig, ReplicaConfig};
use crate::error::Result;
use crate::health::{AtomicHealthStatus, AtomicTimestamp, HealthMonitor};
use crate::models::{HealthStatus, ProcessorRole};

/// Read-only view served on `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub default_active: bool,
    pub fallback_active: bool,
    pub replica_role: ReplicaRole,
}

#[derive(Debug)]
pub struct LeaderCoordinator {
    role: AtomicReplicaRole,
    monitor: Arc<HealthMonitor>,
    peer: Option<Arc<dyn PeerHealthClient>>,
    peer_default: AtomicHealthStatus,
    peer_fallback: AtomicHealthStatus,
    leader_last_seen: AtomicTimestamp,
    failover_timeout: Duration,
    check_interval: Duration,
}

impl LeaderCoordinator {
    /// A follower must be given a peer client
    pub fn new(
        initial_role: ReplicaRole,
        monitor: Arc<HealthMonitor>,
        peer: Option<Arc<dyn PeerHealthClient>>,
        health: &HealthConfig,
        replica: &ReplicaConfig,
    ) -> Result<Self> {
        if initial_role == ReplicaRole::Follower && peer.is_none() {
            return Err(ConfigurationError::missing_required_field(
                "leader_url",
                "replica (follower role)",
            )
            .into());
        }

        info!(
            role = %initial_role,
            failover_timeout_ms = replica.failover_timeout_ms,
            check_interval_ms = health.check_interval_ms,
            "👑 Leader coordinator initialized"
        );

        Ok(Self {
            role: AtomicReplicaRole::new(initial_role),
            monitor,
            peer,
            peer_default: AtomicHealthStatus::default(),
            peer_fallback: AtomicHealthStatus::default(),
            // grace period for the leader starts now
            leader_last_seen: AtomicTimestamp::now(),
            failover_timeout: replica.failover_timeout(),
            check_interval: health.check_interval(),
        })
    }

    pub fn role(&self) -> ReplicaRole {
        self.role.load()
    }

    pub fn acts_as_leader(&self) -> bool {
        self.role().acts_as_leader()
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    /// Time since the last successful peer read
    pub fn leader_last_seen(&self) -> Option<Duration> {
        self.leader_last_seen.elapsed()
    }

    pub fn is_backend_active(&self, processor: ProcessorRole) -> bool {
        self.snapshot(processor).is_active()
    }

    /// Current view of `processor`, local or peer-derived depending on role
    pub fn snapshot(&self, processor: ProcessorRole) -> HealthStatus {
        if self.acts_as_leader() {
            self.monitor.snapshot(processor)
        } else {
            self.peer_view(processor).load()
        }
    }

    pub fn eligibility(&self) -> Eligibility {
        Eligibility {
            default_active: self.is_backend_active(ProcessorRole::Default),
            fallback_active: self.is_backend_active(ProcessorRole::Fallback),
            replica_role: self.role(),
        }
    }

    fn peer_view(&self, processor: ProcessorRole) -> &AtomicHealthStatus {
        match processor {
            ProcessorRole::Default => &self.peer_default,
            ProcessorRole::Fallback => &self.peer_fallback,
        }
    }

    /// One coordination step; returns the role in effect afterwards
    pub async fn tick(&self) -> ReplicaRole {
        if self.acts_as_leader() {
            self.monitor.probe_round().await;
            return self.role();
        }

        if self.read_leader().await {
            return ReplicaRole::Follower;
        }

        let silent_for = self.leader_last_seen.elapsed().unwrap_or_default();
        if silent_for > self.failover_timeout && self.role.promote_to_failover() {
            warn!(
                silent_for_ms = silent_for.as_millis() as u64,
                failover_timeout_ms = self.failover_timeout.as_millis() as u64,
                "🚨 Leader silent past failover timeout; promoting to FAILOVER_LEADER"
            );
            self.monitor.probe_round().await;
        }
        self.role()
    }

    /// Fetch both snapshots from the leader. Returns `true` if any arrived.
    async fn read_leader(&self) -> bool {
        let Some(peer) = self.peer.as_ref() else {
            return false;
        };

        let (default, fallback) = future::join(
            peer.fetch(ProcessorRole::Default),
            peer.fetch(ProcessorRole::Fallback),
        )
        .await;

        let mut seen = false;
        for (processor, status) in [
            (ProcessorRole::Default, default),
            (ProcessorRole::Fallback, fallback),
        ] {
            if let Some(status) = status {
                self.peer_view(processor).store(status);
                seen = true;
            }
        }

        if seen {
            self.leader_last_seen.touch();
        } else {
            debug!("No health snapshot received from leader this tick");
        }
        seen
    }

    /// Tick on the configured interval until `shutdown` fires
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            role = %self.role(),
            interval_ms = self.check_interval.as_millis() as u64,
            "🔄 Health coordination loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        info!(role = %self.role(), "🛑 Health coordination loop stopped");
    }
}
