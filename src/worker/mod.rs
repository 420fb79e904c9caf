//! # Dispatch Workers
//!
//! The worker pool, the per-task dispatch step it runs, and the counters it keeps.

pub mod dispatcher;
pub mod pool;
pub mod stats;

pub use dispatcher::{Disposition, TaskDispatcher};
pub use pool::WorkerPool;
pub use stats::{WorkerPoolStats, WorkerPoolStatsSnapshot};
