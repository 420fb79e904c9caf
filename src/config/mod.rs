//! # Gateway Configuration
//!
//! Typed configuration for the dispatch gateway, assembled by [`ConfigManager`]
//! from built-in defaults, an optional TOML file and `GATEWAY__*` environment
//! overrides (in that order of precedence, lowest first).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use payment_gateway::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let workers = manager.config().workers.count;
//! let window = manager.config().health.rate_limit_window();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring config/gateway.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// External payment processor endpoints
    pub processors: ProcessorsConfig,

    /// Health probing cadence and rate limiting
    pub health: HealthConfig,

    /// Leader/follower coordination between replicas
    pub replica: ReplicaConfig,

    /// Dispatch worker pool
    pub workers: WorkersConfig,

    /// Inbound HTTP surface
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessorsConfig {
    pub default_url: String,
    pub fallback_url: String,
    /// Per-call deadline for `POST /payments`
    pub submit_timeout_ms: u64,
    /// Per-call deadline for `GET /payments/service-health`
    pub probe_timeout_ms: u64,
}

impl ProcessorsConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for ProcessorsConfig {
    fn default() -> Self {
        Self {
            default_url: "http://payment-processor-default:8080".to_string(),
            fallback_url: "http://payment-processor-fallback:8080".to_string(),
            submit_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Tick driving both probing and peer reads
    pub check_interval_ms: u64,
    /// Minimum spacing between two probes of the same backend
    pub rate_limit_window_ms: u64,
    /// Bound on one concurrent probe round; exceeding it marks both backends failing
    pub round_timeout_ms: u64,
}

impl HealthConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 5_000,
            rate_limit_window_ms: 6_000,
            round_timeout_ms: 5_000,
        }
    }
}

/// Role a replica is given at process start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupRole {
    #[default]
    Leader,
    Follower,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplicaConfig {
    pub role: StartupRole,
    /// Base URL of the leader replica; required when `role = "follower"`
    pub leader_url: Option<String>,
    pub peer_timeout_ms: u64,
    pub failover_timeout_ms: u64,
}

impl ReplicaConfig {
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn failover_timeout(&self) -> Duration {
        Duration::from_millis(self.failover_timeout_ms)
    }
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            role: StartupRole::Leader,
            leader_url: None,
            peer_timeout_ms: 3_000,
            failover_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub count: usize,
    /// Retry ceiling; a task whose count would exceed it is dropped
    pub max_retries: u32,
    /// Delay before re-enqueueing when no backend is eligible
    pub retry_delay_ms: u64,
    /// Pause after an unexpected local error
    pub error_backoff_ms: u64,
}

impl WorkersConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: 16,
            max_retries: 15,
            retry_delay_ms: 100,
            error_backoff_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("processors.default_url", &self.processors.default_url)?;
        validate_url("processors.fallback_url", &self.processors.fallback_url)?;

        let positive = [
            ("processors.submit_timeout_ms", self.processors.submit_timeout_ms),
            ("processors.probe_timeout_ms", self.processors.probe_timeout_ms),
            ("health.check_interval_ms", self.health.check_interval_ms),
            ("health.rate_limit_window_ms", self.health.rate_limit_window_ms),
            ("health.round_timeout_ms", self.health.round_timeout_ms),
            ("replica.peer_timeout_ms", self.replica.peer_timeout_ms),
            ("replica.failover_timeout_ms", self.replica.failover_timeout_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "must be greater than zero",
                ));
            }
        }

        if self.workers.count == 0 {
            return Err(ConfigurationError::invalid_value(
                "workers.count",
                "0",
                "at least one worker is required",
            ));
        }

        match (self.replica.role, self.replica.leader_url.as_deref()) {
            (StartupRole::Follower, None) => {
                return Err(ConfigurationError::missing_required_field(
                    "leader_url",
                    "replica (role = follower)",
                ));
            }
            (_, Some(url)) => validate_url("replica.leader_url", url)?,
            (StartupRole::Leader, None) => {}
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> ConfigResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigurationError::invalid_value(field, value, e.to_string()))
}
