use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use payment_gateway::models::{Payment, PaymentTask};

/// Retry counts in the range workers actually produce
pub fn retry_count_strategy() -> impl Strategy<Value = u32> {
    0u32..16
}

/// Positive amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Sequences of retry counts, as enqueued
pub fn retry_sequence_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(retry_count_strategy(), 0..200)
}

pub fn task_with_retries(amount: Decimal, retries: u32) -> PaymentTask {
    let mut task = PaymentTask::new(Payment::new(Uuid::new_v4(), amount)).unwrap();
    for _ in 0..retries {
        task.record_failed_attempt();
    }
    task
}
