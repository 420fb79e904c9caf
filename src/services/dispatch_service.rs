//! # Dispatch Service
//!
//! The engine's inbound contract: accept a payment for asynchronous dispatch,
//! and report the current eligibility picture. Web handlers delegate here.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::coordinator::{Eligibility, LeaderCoordinator, ReplicaRole};
use crate::error::Result;
use crate::health::HealthMonitorStatsSnapshot;
use crate::models::{HealthStatus, PaymentRequest, PaymentTask, ProcessorRole};
use crate::queue::TaskQueue;
use crate::worker::{WorkerPoolStats, WorkerPoolStatsSnapshot};

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub default_active: bool,
    pub fallback_active: bool,
    pub replica_role: ReplicaRole,
    pub queue_depth: usize,
    pub default: HealthStatus,
    pub fallback: HealthStatus,
    pub stats: DispatchStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStats {
    pub delayed_retries: usize,
    pub workers: WorkerPoolStatsSnapshot,
    pub probes: HealthMonitorStatsSnapshot,
}

#[derive(Debug, Clone)]
pub struct DispatchService {
    queue: Arc<TaskQueue>,
    coordinator: Arc<LeaderCoordinator>,
    worker_stats: Arc<WorkerPoolStats>,
}

impl DispatchService {
    pub fn new(
        queue: Arc<TaskQueue>,
        coordinator: Arc<LeaderCoordinator>,
        worker_stats: Arc<WorkerPoolStats>,
    ) -> Self {
        Self {
            queue,
            coordinator,
            worker_stats,
        }
    }

    /// Validate and enqueue; returns the correlation id without waiting for
    /// any processor.
    pub fn submit(&self, request: PaymentRequest) -> Result<Uuid> {
        let payment = request.into_payment()?;
        let task = PaymentTask::new(payment)?;
        let correlation_id = task.correlation_id();
        self.queue.enqueue(task);
        debug!(correlation_id = %correlation_id, "Payment queued for dispatch");
        Ok(correlation_id)
    }

    pub fn eligibility(&self) -> Eligibility {
        self.coordinator.eligibility()
    }

    pub fn health_report(&self) -> HealthReport {
        let eligibility = self.coordinator.eligibility();
        HealthReport {
            default_active: eligibility.default_active,
            fallback_active: eligibility.fallback_active,
            replica_role: eligibility.replica_role,
            queue_depth: self.queue.len(),
            default: self.coordinator.snapshot(ProcessorRole::Default),
            fallback: self.coordinator.snapshot(ProcessorRole::Fallback),
            stats: DispatchStats {
                delayed_retries: self.queue.delayed(),
                workers: self.worker_stats.snapshot(),
                probes: self.coordinator.monitor().stats().snapshot(),
            },
        }
    }

    /// Snapshot for peers; `None` unless this replica is probing itself
    pub fn peer_snapshot(&self, processor: ProcessorRole) -> Option<HealthStatus> {
        self.coordinator
            .acts_as_leader()
            .then(|| self.coordinator.snapshot(processor))
    }
}
