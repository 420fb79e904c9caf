//! Throwaway axum server standing in for an external payment processor.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug)]
struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
pub struct StubProcessor {
    base_url: String,
    health: Mutex<Reply>,
    submit: Mutex<Reply>,
    received: Mutex<Vec<Value>>,
    health_requests: AtomicUsize,
}

impl StubProcessor {
    /// Start a healthy processor that accepts every payment
    pub async fn start() -> Arc<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stub = Arc::new(Self {
            base_url: format!("http://{addr}"),
            health: Mutex::new(Reply::ok(r#"{"failing":false,"minResponseTime":7}"#)),
            submit: Mutex::new(Reply::ok(r#"{"message":"payment processed successfully"}"#)),
            received: Mutex::new(Vec::new()),
            health_requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/payments", post(submit_payment))
            .route("/payments/service-health", get(service_health))
            .with_state(stub.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        stub
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_health(&self, status: StatusCode, body: &str) {
        let mut reply = self.health.lock();
        reply.status = status;
        reply.body = body.to_string();
    }

    pub fn set_health_delay(&self, delay: Duration) {
        self.health.lock().delay = delay;
    }

    pub fn set_failing(&self, failing: bool) {
        self.set_health(
            StatusCode::OK,
            &format!(r#"{{"failing":{failing},"minResponseTime":7}}"#),
        );
    }

    pub fn set_submit(&self, status: StatusCode, body: &str) {
        let mut reply = self.submit.lock();
        reply.status = status;
        reply.body = body.to_string();
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        self.submit.lock().delay = delay;
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().clone()
    }

    pub fn health_requests(&self) -> usize {
        self.health_requests.load(Ordering::SeqCst)
    }
}

async fn submit_payment(
    State(stub): State<Arc<StubProcessor>>,
    body: String,
) -> (StatusCode, String) {
    if let Ok(value) = serde_json::from_str::<Value>(&body) {
        stub.received.lock().push(value);
    }
    let (status, body, delay) = {
        let reply = stub.submit.lock();
        (reply.status, reply.body.clone(), reply.delay)
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (status, body)
}

async fn service_health(State(stub): State<Arc<StubProcessor>>) -> (StatusCode, String) {
    stub.health_requests.fetch_add(1, Ordering::SeqCst);
    let (status, body, delay) = {
        let reply = stub.health.lock();
        (reply.status, reply.body.clone(), reply.delay)
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (status, body)
}
