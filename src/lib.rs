#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Payment Gateway
//!
//! Dispatch engine that sits between inbound payment requests and two
//! interchangeable payment processors, `default` (preferred) and `fallback`.
//!
//! ## Overview
//!
//! Requests are accepted immediately and queued. A pool of workers drains the
//! queue, routing each payment to whichever processor is currently healthy and
//! retrying failures without blocking the caller. Processors rate-limit their
//! health endpoint, so replicas coordinate: one leader probes and publishes
//! snapshots, followers read them, and a follower that stops hearing from the
//! leader takes over probing itself.
//!
//! ## Module Organization
//!
//! - [`models`] - Payment, task, health snapshot and summary values
//! - [`gateway`] - Processor capability and its HTTP implementation
//! - [`health`] - Rate-limited probing and atomic snapshots
//! - [`coordinator`] - Leader/follower role state machine and failover
//! - [`queue`] - Retry-ordered task queue with blocking dequeue
//! - [`worker`] - Worker pool and per-task dispatch
//! - [`persistence`] - Committed payment sink and reporting
//! - [`services`] - Ingestion and eligibility reporting
//! - [`web`] - axum inbound surface
//! - [`bootstrap`] - Component wiring and lifecycle
//! - [`config`] - Configuration management
//! - [`logging`] - tracing initialisation
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use payment_gateway::bootstrap::GatewayBootstrap;
//! use payment_gateway::logging;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! logging::init_structured_logging();
//! let handle = GatewayBootstrap::bootstrap().await?;
//! println!("listening on {}", handle.local_addr());
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod services;
pub mod web;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{GatewayBootstrap, GatewayHandle};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
