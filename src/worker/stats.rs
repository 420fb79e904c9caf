use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::ProcessorRole;

/// Counters shared by every worker in the pool
#[derive(Debug, Default)]
pub struct WorkerPoolStats {
    pub committed_default: AtomicU64,
    pub committed_fallback: AtomicU64,
    /// Re-enqueued after a failed attempt (soon or later)
    pub requeued: AtomicU64,
    /// Terminal failures past the retry ceiling
    pub dropped: AtomicU64,
    /// Faults on our side, e.g. the persistence sink refusing a record
    pub local_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPoolStatsSnapshot {
    pub committed_default: u64,
    pub committed_fallback: u64,
    pub requeued: u64,
    pub dropped: u64,
    pub local_errors: u64,
}

impl WorkerPoolStats {
    pub fn record_commit(&self, processor: ProcessorRole) {
        let counter = match processor {
            ProcessorRole::Default => &self.committed_default,
            ProcessorRole::Fallback => &self.committed_fallback,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_requeue(&self) {
        self.requeued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_error(&self) {
        self.local_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WorkerPoolStatsSnapshot {
        WorkerPoolStatsSnapshot {
            committed_default: self.committed_default.load(Ordering::Relaxed),
            committed_fallback: self.committed_fallback.load(Ordering::Relaxed),
            requeued: self.requeued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            local_errors: self.local_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_counted_per_processor() {
        let stats = WorkerPoolStats::default();
        stats.record_commit(ProcessorRole::Default);
        stats.record_commit(ProcessorRole::Default);
        stats.record_commit(ProcessorRole::Fallback);
        stats.record_drop();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.committed_default, 2);
        assert_eq!(snapshot.committed_fallback, 1);
        assert_eq!(snapshot.dropped, 1);
        assert_eq!(snapshot.requeued, 0);
    }
}
