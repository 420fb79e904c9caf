//! # Services
//!
//! Operations the web layer delegates to, kept free of any HTTP types.

pub mod dispatch_service;

pub use dispatch_service::{DispatchService, DispatchStats, HealthReport};
