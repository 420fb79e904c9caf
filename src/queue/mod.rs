//! # Dispatch Queue
//!
//! In-memory retry-ordered queue between payment ingestion and the worker pool.
//! Queued tasks do not survive a restart.

pub mod task_queue;

pub use task_queue::TaskQueue;
