#![allow(dead_code)]

pub mod stub_processor;
pub mod strategies;

use std::future::Future;
use std::time::Duration;

use payment_gateway::config::GatewayConfig;

pub use stub_processor::StubProcessor;

/// Config with short timings, bound to an ephemeral local port
pub fn fast_config(default_url: &str, fallback_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.processors.default_url = default_url.to_string();
    config.processors.fallback_url = fallback_url.to_string();
    config.processors.submit_timeout_ms = 1_000;
    config.processors.probe_timeout_ms = 500;
    config.health.check_interval_ms = 50;
    config.health.rate_limit_window_ms = 100;
    config.health.round_timeout_ms = 80;
    config.replica.peer_timeout_ms = 200;
    config.replica.failover_timeout_ms = 400;
    config.workers.count = 4;
    config.workers.retry_delay_ms = 20;
    config.workers.error_backoff_ms = 10;
    config.web.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Poll `check` until it returns true or `timeout` elapses
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
