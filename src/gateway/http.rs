//! # HTTP Processor Gateway
//!
//! reqwest-backed [`ProcessorGateway`] for a processor reachable at a base URL:
//!
//! - `POST {base}/payments` with the JSON payment body
//! - `GET {base}/payments/service-health` returning `{failing, minResponseTime}`

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

use super::{ProcessorGateway, SubmitOutcome};
use crate::config::ConfigurationError;
use crate::constants::{paths, resolve_under};
use crate::error::Result;
use crate::models::{HealthStatus, ProcessorRole};

#[derive(Debug, Clone)]
pub struct HttpProcessorGateway {
    role: ProcessorRole,
    client: Client,
    payments_url: Url,
    health_url: Url,
    submit_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpProcessorGateway {
    /// `client` is shared between gateways; deadlines are applied per request
    pub fn new(
        role: ProcessorRole,
        client: Client,
        base_url: &str,
        submit_timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| {
            ConfigurationError::invalid_value(
                format!("processors.{}_url", role.as_str()),
                base_url,
                e.to_string(),
            )
        })?;
        let payments_url = join(&base, paths::PROCESSOR_PAYMENTS)?;
        let health_url = join(&base, paths::PROCESSOR_SERVICE_HEALTH)?;

        Ok(Self {
            role,
            client,
            payments_url,
            health_url,
            submit_timeout,
            probe_timeout,
        })
    }

    pub fn payments_url(&self) -> &Url {
        &self.payments_url
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    resolve_under(base, path).ok_or_else(|| {
        ConfigurationError::invalid_value("processor path", path, "cannot be joined onto base URL")
            .into()
    })
}

/// Map a submit response to an outcome.
///
/// Processors signal an already-seen correlation id with 409, or with 422 and
/// a body mentioning it already exists.
pub(crate) fn classify_submit(status: StatusCode, body: &str) -> SubmitOutcome {
    if status.is_success() {
        return SubmitOutcome::Accepted;
    }
    match status {
        StatusCode::CONFLICT => SubmitOutcome::DuplicateAccepted,
        StatusCode::UNPROCESSABLE_ENTITY if body.to_ascii_lowercase().contains("already") => {
            SubmitOutcome::DuplicateAccepted
        }
        _ => SubmitOutcome::Rejected,
    }
}

#[async_trait]
impl ProcessorGateway for HttpProcessorGateway {
    fn role(&self) -> ProcessorRole {
        self.role
    }

    async fn submit(&self, body: &str) -> SubmitOutcome {
        let response = self
            .client
            .post(self.payments_url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .timeout(self.submit_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    processor = %self.role,
                    url = %self.payments_url,
                    error = %e,
                    "Payment submission failed in transport"
                );
                return SubmitOutcome::Rejected;
            }
        };

        let status = response.status();
        let text = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        let outcome = classify_submit(status, &text);

        match outcome {
            SubmitOutcome::Rejected => warn!(
                processor = %self.role,
                status = %status,
                response = %text,
                "Payment submission rejected"
            ),
            _ => debug!(processor = %self.role, status = %status, outcome = %outcome, "Payment submitted"),
        }
        outcome
    }

    async fn probe_health(&self) -> HealthStatus {
        let response = self
            .client
            .get(self.health_url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(processor = %self.role, error = %e, "Health probe failed in transport");
                return HealthStatus::failing();
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<HealthStatus>().await {
                Ok(status) => {
                    debug!(
                        processor = %self.role,
                        failing = status.failing,
                        min_response_time = status.min_response_time,
                        "Health probe completed"
                    );
                    status
                }
                Err(e) => {
                    warn!(processor = %self.role, error = %e, "Malformed health probe body");
                    HealthStatus::failing()
                }
            },
            StatusCode::TOO_MANY_REQUESTS => {
                debug!(processor = %self.role, "Health probe rate limited; backend is reachable");
                HealthStatus::rate_limited()
            }
            status => {
                warn!(processor = %self.role, status = %status, "Health probe returned non-success");
                HealthStatus::failing()
            }
        }
    }
}
