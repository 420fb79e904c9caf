//! # Task Queue
//!
//! Shared queue of pending [`PaymentTask`]s, drained by the worker pool.
//!
//! Ordering is `retry_count` ascending, then enqueue order. The enqueue order is
//! an explicit sequence number assigned under the queue lock, so two tasks with
//! the same retry count always come out FIFO.
//!
//! The lock only guards a heap push or pop; waiting for work happens on a
//! [`Notify`] outside of it.

use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::trace;

use crate::models::PaymentTask;

#[derive(Debug)]
struct Entry {
    retry_count: u32,
    sequence: u64,
    task: PaymentTask,
}

impl Entry {
    fn key(&self) -> (u32, u64) {
        (self.retry_count, self.sequence)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; the smallest key must compare greatest
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other.key().cmp(&self.key())
    }
}

#[derive(Debug, Default)]
struct QueueState {
    heap: BinaryHeap<Entry>,
    next_sequence: u64,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Notify,
    delayed: AtomicUsize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task and wake one waiting worker
    pub fn enqueue(&self, task: PaymentTask) {
        {
            let mut state = self.state.lock();
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            trace!(
                correlation_id = %task.correlation_id(),
                retry_count = task.retry_count(),
                sequence,
                "Task enqueued"
            );
            state.heap.push(Entry {
                retry_count: task.retry_count(),
                sequence,
                task,
            });
        }
        self.available.notify_one();
    }

    /// Re-insert after a failed attempt ("retry soon")
    pub fn enqueue_retry(&self, task: PaymentTask) {
        self.enqueue(task);
    }

    /// Re-insert once `delay` has passed ("retry later"). The task is not
    /// visible to workers meanwhile but is counted by [`Self::delayed`].
    pub fn enqueue_retry_after(self: &Arc<Self>, task: PaymentTask, delay: Duration) {
        if delay.is_zero() {
            self.enqueue(task);
            return;
        }
        self.delayed.fetch_add(1, Ordering::AcqRel);
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.delayed.fetch_sub(1, Ordering::AcqRel);
            queue.enqueue(task);
        });
    }

    /// Pop the next task without waiting
    pub fn try_dequeue(&self) -> Option<PaymentTask> {
        let (entry, more) = {
            let mut state = self.state.lock();
            let entry = state.heap.pop()?;
            (entry, !state.heap.is_empty())
        };
        if more {
            // hand any coalesced wakeup on to the next waiter
            self.available.notify_one();
        }
        Some(entry.task)
    }

    /// Wait until a task is available and take it. Cancel-safe: dropping the
    /// future never loses a task.
    pub async fn dequeue_blocking(&self) -> PaymentTask {
        loop {
            if let Some(task) = self.try_dequeue() {
                return task;
            }
            self.available.notified().await;
        }
    }

    /// Tasks ready for dequeue
    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks waiting out a retry delay
    pub fn delayed(&self) -> usize {
        self.delayed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Payment;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_pending, assert_ready, task};
    use uuid::Uuid;

    fn task_with_retries(retries: u32) -> PaymentTask {
        let mut task = PaymentTask::new(Payment::new(Uuid::new_v4(), dec!(10.00))).unwrap();
        for _ in 0..retries {
            task.record_failed_attempt();
        }
        task
    }

    #[test]
    fn test_fewer_retries_dequeued_first() {
        let queue = TaskQueue::new();
        let heavy = task_with_retries(3);
        let fresh = task_with_retries(0);
        let once = task_with_retries(1);
        queue.enqueue(heavy.clone());
        queue.enqueue(fresh.clone());
        queue.enqueue(once.clone());

        assert_eq!(queue.try_dequeue(), Some(fresh));
        assert_eq!(queue.try_dequeue(), Some(once));
        assert_eq!(queue.try_dequeue(), Some(heavy));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn test_equal_retries_are_fifo() {
        let queue = TaskQueue::new();
        let tasks: Vec<_> = (0..50).map(|_| task_with_retries(2)).collect();
        for task in &tasks {
            queue.enqueue_retry(task.clone());
        }

        let drained: Vec<_> = std::iter::from_fn(|| queue.try_dequeue()).collect();
        assert_eq!(drained, tasks);
    }

    #[test]
    fn test_len_tracks_contents() {
        let queue = TaskQueue::new();
        assert!(queue.is_empty());
        queue.enqueue(task_with_retries(0));
        queue.enqueue(task_with_retries(0));
        assert_eq!(queue.len(), 2);
        queue.try_dequeue();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_dequeue_blocking_waits_for_enqueue() {
        let queue = TaskQueue::new();
        let mut dequeue = task::spawn(queue.dequeue_blocking());
        assert_pending!(dequeue.poll());

        let payment = task_with_retries(0);
        queue.enqueue(payment.clone());

        assert!(dequeue.is_woken());
        let received = assert_ready!(dequeue.poll());
        assert_eq!(received, payment);
    }

    #[test]
    fn test_enqueue_before_wait_is_not_lost() {
        let queue = TaskQueue::new();
        queue.enqueue(task_with_retries(0));
        let mut dequeue = task::spawn(queue.dequeue_blocking());
        assert_ready!(dequeue.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_holds_task_back() {
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue_retry_after(task_with_retries(1), Duration::from_millis(100));
        tokio::task::yield_now().await;

        assert!(queue.is_empty());
        assert_eq!(queue.delayed(), 1);

        tokio::time::sleep(Duration::from_millis(101)).await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.delayed(), 0);
    }

    #[tokio::test]
    async fn test_waiting_workers_all_receive_tasks() {
        let queue = Arc::new(TaskQueue::new());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            waiters.push(tokio::spawn(async move { queue.dequeue_blocking().await }));
        }
        tokio::task::yield_now().await;

        for _ in 0..4 {
            queue.enqueue(task_with_retries(0));
        }
        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(5), waiter)
                .await
                .unwrap()
                .unwrap();
        }
        assert!(queue.is_empty());
    }
}
