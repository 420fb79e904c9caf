//! # Peer Health Client
//!
//! How a follower reads the leader's published snapshots. Any failure
//! (transport, timeout, non-200, unparseable body) is reported as `None`, which
//! leaves the follower's last-seen timestamp untouched.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ConfigurationError;
use crate::constants::{internal_health_path, resolve_under};
use crate::error::Result;
use crate::models::{HealthStatus, ProcessorRole};

#[async_trait]
pub trait PeerHealthClient: Send + Sync + fmt::Debug {
    /// Leader's current snapshot for `processor`, or `None` if it could not be read
    async fn fetch(&self, processor: ProcessorRole) -> Option<HealthStatus>;
}

/// Reads `GET {leader}/internal/health/{default|fallback}`
#[derive(Debug, Clone)]
pub struct HttpPeerHealthClient {
    client: Client,
    leader_url: Url,
    timeout: Duration,
}

impl HttpPeerHealthClient {
    pub fn new(client: Client, leader_url: &str, timeout: Duration) -> Result<Self> {
        let leader_url = Url::parse(leader_url).map_err(|e| {
            ConfigurationError::invalid_value("replica.leader_url", leader_url, e.to_string())
        })?;

        info!(
            leader_url = %leader_url,
            timeout_ms = timeout.as_millis() as u64,
            "Created peer health client"
        );

        Ok(Self {
            client,
            leader_url,
            timeout,
        })
    }

    pub fn url_for(&self, processor: ProcessorRole) -> Option<Url> {
        resolve_under(&self.leader_url, &internal_health_path(processor))
    }
}

#[async_trait]
impl PeerHealthClient for HttpPeerHealthClient {
    async fn fetch(&self, processor: ProcessorRole) -> Option<HealthStatus> {
        let url = self.url_for(processor)?;
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(processor = %processor, error = %e, "Leader unreachable");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            debug!(
                processor = %processor,
                status = %response.status(),
                "Leader declined health query"
            );
            return None;
        }

        match response.json::<HealthStatus>().await {
            Ok(status) => Some(status),
            Err(e) => {
                debug!(processor = %processor, error = %e, "Unparseable leader health body");
                None
            }
        }
    }
}
