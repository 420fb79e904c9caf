//! # Task Dispatcher
//!
//! One dispatch attempt for one task: pick an eligible processor (default
//! first), submit, and either commit the result or put the task back.
//!
//! | Situation | Result |
//! |---|---|
//! | a processor accepted, sink stored it | committed |
//! | processors attempted, all rejected | `retry_count + 1`, re-enqueued now |
//! | no processor eligible | `retry_count + 1`, re-enqueued after `retry_delay` |
//! | `retry_count + 1 > max_retries` | dropped and logged |
//! | accepted but sink failed | re-enqueued with `retry_count` unchanged |
//! | dispatch panicked | `retry_count + 1`, re-enqueued now, worker backs off |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::stats::WorkerPoolStats;
use crate::config::WorkersConfig;
use crate::coordinator::LeaderCoordinator;
use crate::gateway::ProcessorGateway;
use crate::models::{PaymentRecord, PaymentTask, ProcessorRole};
use crate::persistence::PersistenceSink;
use crate::queue::TaskQueue;

/// What happened to a task after one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Committed(ProcessorRole),
    /// Rejected by every eligible processor; back in the queue immediately
    RetrySoon { retry_count: u32 },
    /// Nothing was eligible; back in the queue after the retry delay
    RetryLater { retry_count: u32 },
    /// Retry ceiling exceeded
    Dropped { retry_count: u32 },
    /// Processor accepted but the record could not be stored
    PersistFailed,
    /// The attempt panicked; back in the queue immediately
    Panicked { retry_count: u32 },
}

impl Disposition {
    /// Failures on our side, after which a worker backs off
    pub fn is_local_error(&self) -> bool {
        matches!(
            self,
            Disposition::PersistFailed | Disposition::Panicked { .. }
        )
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Committed(processor) => write!(f, "committed via {processor}"),
            Disposition::RetrySoon { retry_count } => write!(f, "retry soon ({retry_count})"),
            Disposition::RetryLater { retry_count } => write!(f, "retry later ({retry_count})"),
            Disposition::Dropped { retry_count } => write!(f, "dropped after {retry_count}"),
            Disposition::PersistFailed => write!(f, "persist failed"),
            Disposition::Panicked { retry_count } => write!(f, "panicked ({retry_count})"),
        }
    }
}

/// Everything a worker needs to move a task forward
#[derive(Debug)]
pub struct TaskDispatcher {
    queue: Arc<TaskQueue>,
    coordinator: Arc<LeaderCoordinator>,
    default_gateway: Arc<dyn ProcessorGateway>,
    fallback_gateway: Arc<dyn ProcessorGateway>,
    sink: Arc<dyn PersistenceSink>,
    stats: Arc<WorkerPoolStats>,
    max_retries: u32,
    retry_delay: Duration,
    error_backoff: Duration,
}

impl TaskDispatcher {
    pub fn new(
        queue: Arc<TaskQueue>,
        coordinator: Arc<LeaderCoordinator>,
        default_gateway: Arc<dyn ProcessorGateway>,
        fallback_gateway: Arc<dyn ProcessorGateway>,
        sink: Arc<dyn PersistenceSink>,
        config: &WorkersConfig,
    ) -> Self {
        Self {
            queue,
            coordinator,
            default_gateway,
            fallback_gateway,
            sink,
            stats: Arc::new(WorkerPoolStats::default()),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            error_backoff: config.error_backoff(),
        }
    }

    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }

    pub fn stats(&self) -> &Arc<WorkerPoolStats> {
        &self.stats
    }

    pub fn error_backoff(&self) -> Duration {
        self.error_backoff
    }

    /// Run one attempt for `task`. Never fails: every outcome leaves the task
    /// committed, re-enqueued or dropped.
    pub async fn dispatch(&self, task: PaymentTask) -> Disposition {
        let mut attempted = false;
        for gateway in [&self.default_gateway, &self.fallback_gateway] {
            let processor = gateway.role();
            if !self.coordinator.is_backend_active(processor) {
                continue;
            }
            attempted = true;
            let outcome = gateway.submit(task.body()).await;
            if outcome.is_accepted() {
                return self.commit(task, processor).await;
            }
            debug!(
                correlation_id = %task.correlation_id(),
                processor = %processor,
                outcome = %outcome,
                "Processor did not accept payment"
            );
        }

        self.fail_attempt(task, attempted)
    }

    async fn commit(&self, task: PaymentTask, processor: ProcessorRole) -> Disposition {
        let record = PaymentRecord::committed(task.payment(), processor);
        match self.sink.record(record).await {
            Ok(()) => {
                self.stats.record_commit(processor);
                debug!(
                    correlation_id = %task.correlation_id(),
                    processor = %processor,
                    retry_count = task.retry_count(),
                    "✅ Payment committed"
                );
                Disposition::Committed(processor)
            }
            Err(e) => {
                error!(
                    correlation_id = %task.correlation_id(),
                    processor = %processor,
                    error = %e,
                    "Failed to persist accepted payment; re-enqueueing"
                );
                self.stats.record_local_error();
                // processor will report the id as a duplicate next time
                self.queue.enqueue_retry(task);
                Disposition::PersistFailed
            }
        }
    }

    /// Put back a task whose attempt panicked. The panic counts as a failed
    /// attempt so a task that always panics still reaches the retry ceiling.
    pub fn recover_panicked(&self, mut task: PaymentTask, reason: &str) -> Disposition {
        self.stats.record_local_error();
        let retry_count = task.record_failed_attempt();
        if let Some(dropped) = self.drop_if_exhausted(&task, retry_count) {
            return dropped;
        }

        error!(
            correlation_id = %task.correlation_id(),
            retry_count,
            panic = %reason,
            "💥 Dispatch panicked; re-enqueueing"
        );
        self.stats.record_requeue();
        self.queue.enqueue_retry(task);
        Disposition::Panicked { retry_count }
    }

    fn fail_attempt(&self, mut task: PaymentTask, attempted: bool) -> Disposition {
        let retry_count = task.record_failed_attempt();
        if let Some(dropped) = self.drop_if_exhausted(&task, retry_count) {
            return dropped;
        }

        self.stats.record_requeue();
        if attempted {
            self.queue.enqueue_retry(task);
            Disposition::RetrySoon { retry_count }
        } else {
            warn!(
                correlation_id = %task.correlation_id(),
                retry_count,
                delay_ms = self.retry_delay.as_millis() as u64,
                "No processor eligible; retrying later"
            );
            self.queue.enqueue_retry_after(task, self.retry_delay);
            Disposition::RetryLater { retry_count }
        }
    }

    fn drop_if_exhausted(&self, task: &PaymentTask, retry_count: u32) -> Option<Disposition> {
        if retry_count <= self.max_retries {
            return None;
        }
        error!(
            correlation_id = %task.correlation_id(),
            amount = %task.payment().amount(),
            retry_count,
            max_retries = self.max_retries,
            "❌ Payment dropped after exhausting retries"
        );
        self.stats.record_drop();
        Some(Disposition::Dropped { retry_count })
    }
}
