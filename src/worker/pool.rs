//! # Worker Pool
//!
//! Fixed number of tokio tasks draining the [`TaskQueue`] through a shared
//! [`TaskDispatcher`]. Each worker checks the shutdown token before every
//! dequeue and while waiting for work, but always finishes the task it holds.
//! A panic inside a dispatch is caught, the task is put back and the worker
//! keeps running.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::dispatcher::TaskDispatcher;

#[derive(Debug)]
pub struct WorkerPool {
    dispatcher: Arc<TaskDispatcher>,
    handles: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn `count` workers bound to `shutdown`
    pub fn start(dispatcher: Arc<TaskDispatcher>, count: usize, shutdown: CancellationToken) -> Self {
        let handles = (0..count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&dispatcher),
                    shutdown.clone(),
                ))
            })
            .collect();

        info!(workers = count, "🚀 Worker pool started");

        Self {
            dispatcher,
            handles,
            shutdown,
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn dispatcher(&self) -> &Arc<TaskDispatcher> {
        &self.dispatcher
    }

    /// Cancel and wait for every worker to exit
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.join().await;
    }

    /// Wait for every worker to exit once the token is cancelled elsewhere
    pub async fn join(self) {
        for (worker_id, handle) in self.handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker_id, error = %e, "Worker task ended abnormally");
            }
        }
        info!("🛑 Worker pool stopped");
    }
}

async fn run_worker(worker_id: usize, dispatcher: Arc<TaskDispatcher>, shutdown: CancellationToken) {
    debug!(worker_id, "Worker started");
    let queue = Arc::clone(dispatcher.queue());

    loop {
        let task = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            task = queue.dequeue_blocking() => task,
        };

        let retained = task.clone();
        let disposition = match AssertUnwindSafe(dispatcher.dispatch(task))
            .catch_unwind()
            .await
        {
            Ok(disposition) => disposition,
            Err(panic) => dispatcher.recover_panicked(retained, &panic_message(panic.as_ref())),
        };
        if disposition.is_local_error() {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(dispatcher.error_backoff()) => {}
            }
        }
    }

    debug!(worker_id, "Worker stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
