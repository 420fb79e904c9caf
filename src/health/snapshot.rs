//! Lock-free cells for health snapshots and monotonic timestamps.
//!
//! A [`HealthStatus`] packs into one `u64` (failing flag in bit 32, latency in
//! the low 32 bits), so a snapshot is replaced with a single atomic store and
//! readers can never observe a torn value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::models::HealthStatus;

const FAILING_BIT: u64 = 1 << 32;
const LATENCY_MASK: u64 = 0xFFFF_FFFF;

fn pack(status: HealthStatus) -> u64 {
    let failing = if status.failing { FAILING_BIT } else { 0 };
    failing | u64::from(status.min_response_time)
}

fn unpack(raw: u64) -> HealthStatus {
    HealthStatus {
        failing: raw & FAILING_BIT != 0,
        min_response_time: (raw & LATENCY_MASK) as u32,
    }
}

/// Atomically swappable [`HealthStatus`]
#[derive(Debug)]
pub struct AtomicHealthStatus(AtomicU64);

impl AtomicHealthStatus {
    pub fn new(status: HealthStatus) -> Self {
        Self(AtomicU64::new(pack(status)))
    }

    pub fn load(&self) -> HealthStatus {
        unpack(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, status: HealthStatus) {
        self.0.store(pack(status), Ordering::Release);
    }

    /// Replace the snapshot, returning the previous one
    pub fn swap(&self, status: HealthStatus) -> HealthStatus {
        unpack(self.0.swap(pack(status), Ordering::AcqRel))
    }
}

impl Default for AtomicHealthStatus {
    fn default() -> Self {
        Self::new(HealthStatus::default())
    }
}

/// Sentinel for "never happened"
const NEVER: u64 = u64::MAX;

/// Monotonic point in time stored as milliseconds since `base`.
///
/// Uses tokio's clock so paused-time tests drive it deterministically.
#[derive(Debug)]
pub struct AtomicTimestamp {
    base: Instant,
    millis: AtomicU64,
}

impl AtomicTimestamp {
    /// A timestamp that has never been set
    pub fn never() -> Self {
        Self {
            base: Instant::now(),
            millis: AtomicU64::new(NEVER),
        }
    }

    /// A timestamp set to the moment of construction
    pub fn now() -> Self {
        Self {
            base: Instant::now(),
            millis: AtomicU64::new(0),
        }
    }

    fn current_millis(&self) -> u64 {
        Instant::now().duration_since(self.base).as_millis() as u64
    }

    pub fn touch(&self) {
        self.millis.store(self.current_millis(), Ordering::Release);
    }

    /// Time since the last `touch`, or `None` if it never happened
    pub fn elapsed(&self) -> Option<Duration> {
        match self.millis.load(Ordering::Acquire) {
            NEVER => None,
            at => Some(Duration::from_millis(self.current_millis().saturating_sub(at))),
        }
    }

    /// Claim the slot if at least `window` has passed since the last claim (or
    /// none happened). Exactly one concurrent caller wins a given window.
    pub fn try_claim(&self, window: Duration) -> bool {
        let window_ms = window.as_millis() as u64;
        let now = self.current_millis();
        let mut observed = self.millis.load(Ordering::Acquire);
        loop {
            let due = observed == NEVER || now.saturating_sub(observed) >= window_ms;
            if !due {
                return false;
            }
            match self.millis.compare_exchange_weak(
                observed,
                now,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => observed = actual,
            }
        }
    }
}
