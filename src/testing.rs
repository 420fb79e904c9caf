//! In-crate fakes for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::PeerHealthClient;
use crate::error::{GatewayError, Result};
use crate::gateway::{ProcessorGateway, SubmitOutcome};
use crate::models::{HealthStatus, PaymentRecord, ProcessorRole};
use crate::persistence::PersistenceSink;

/// Scriptable processor: fixed health, fixed or queued submit outcomes
#[derive(Debug)]
pub struct FakeGateway {
    role: ProcessorRole,
    health: Mutex<HealthStatus>,
    outcome: Mutex<SubmitOutcome>,
    scripted: Mutex<VecDeque<SubmitOutcome>>,
    probe_delay: Mutex<Duration>,
    submit_delay: Mutex<Duration>,
    panic_on_probe: AtomicBool,
    probes: AtomicUsize,
    probes_finished: AtomicUsize,
    submitted: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn healthy(role: ProcessorRole) -> Arc<Self> {
        Arc::new(Self {
            role,
            health: Mutex::new(HealthStatus::healthy(5)),
            outcome: Mutex::new(SubmitOutcome::Accepted),
            scripted: Mutex::new(VecDeque::new()),
            probe_delay: Mutex::new(Duration::ZERO),
            submit_delay: Mutex::new(Duration::ZERO),
            panic_on_probe: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
            probes_finished: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn set_health(&self, status: HealthStatus) {
        *self.health.lock() = status;
    }

    pub fn set_outcome(&self, outcome: SubmitOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Outcomes returned before falling back to the fixed one
    pub fn script(&self, outcomes: impl IntoIterator<Item = SubmitOutcome>) {
        self.scripted.lock().extend(outcomes);
    }

    pub fn set_probe_delay(&self, delay: Duration) {
        *self.probe_delay.lock() = delay;
    }

    /// Hold every submit this long before answering
    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock() = delay;
    }

    pub fn panic_on_probe(&self) {
        self.panic_on_probe.store(true, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Probes that ran to completion rather than being dropped mid-flight
    pub fn probes_finished(&self) -> usize {
        self.probes_finished.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().len()
    }

    pub fn submitted_bodies(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl ProcessorGateway for FakeGateway {
    fn role(&self) -> ProcessorRole {
        self.role
    }

    async fn submit(&self, body: &str) -> SubmitOutcome {
        self.submitted.lock().push(body.to_owned());
        let delay = *self.submit_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.scripted.lock().pop_front();
        scripted.unwrap_or_else(|| *self.outcome.lock())
    }

    async fn probe_health(&self) -> HealthStatus {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_probe.load(Ordering::SeqCst) {
            panic!("probe exploded");
        }
        let delay = *self.probe_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.probes_finished.fetch_add(1, Ordering::SeqCst);
        *self.health.lock()
    }
}

/// Leader stand-in; `None` models an unreachable leader
#[derive(Debug, Default)]
pub struct FakePeer {
    view: Mutex<Option<(HealthStatus, HealthStatus)>>,
    fetches: AtomicUsize,
}

impl FakePeer {
    pub fn reachable(default: HealthStatus, fallback: HealthStatus) -> Arc<Self> {
        let peer = Self::default();
        *peer.view.lock() = Some((default, fallback));
        Arc::new(peer)
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_view(&self, view: Option<(HealthStatus, HealthStatus)>) {
        *self.view.lock() = view;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerHealthClient for FakePeer {
    async fn fetch(&self, processor: ProcessorRole) -> Option<HealthStatus> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let view = *self.view.lock();
        view.map(|(default, fallback)| match processor {
            ProcessorRole::Default => default,
            ProcessorRole::Fallback => fallback,
        })
    }
}

/// Sink that fails (or panics on) its first writes and records the rest
#[derive(Debug, Default)]
pub struct FlakySink {
    failures: AtomicUsize,
    panics: AtomicUsize,
    calls: AtomicUsize,
    records: Mutex<Vec<PaymentRecord>>,
}

impl FlakySink {
    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        })
    }

    pub fn panicking_first(panics: usize) -> Arc<Self> {
        Arc::new(Self {
            panics: AtomicUsize::new(panics),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl PersistenceSink for FlakySink {
    async fn record(&self, record: PaymentRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let panics = self.panics.load(Ordering::SeqCst);
        if panics > 0 {
            self.panics.store(panics - 1, Ordering::SeqCst);
            panic!("sink exploded");
        }
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(GatewayError::persistence("store unavailable"));
        }
        self.records.lock().push(record);
        Ok(())
    }
}
