//! # Web API Routes
//!
//! Route definitions grouped by audience.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::constants::paths;
use crate::web::{handlers, state::AppState};

/// Payment ingestion and reporting
pub fn payment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(paths::PAYMENTS, post(handlers::payments::submit_payment))
        .route(
            paths::PAYMENTS_SUMMARY,
            get(handlers::payments::payments_summary),
        )
        .route(
            paths::PURGE_PAYMENTS,
            post(handlers::payments::purge_payments),
        )
}

/// Public health report
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route(paths::HEALTH, get(handlers::health::health_report))
}

/// Peer-facing snapshot surface read by follower replicas
pub fn internal_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/{{processor}}", paths::INTERNAL_HEALTH),
        get(handlers::health::internal_health),
    )
}
