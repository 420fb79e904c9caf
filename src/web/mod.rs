//! # Inbound HTTP Surface
//!
//! axum application exposing payment ingestion, reporting, the public health
//! report and the internal peer health surface.

pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;

use axum::Router;
use std::sync::Arc;

pub use response_types::{ApiError, ApiResult};
pub use state::AppState;

/// Build the complete router over `state`
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::payment_routes())
        .merge(routes::health_routes())
        .merge(routes::internal_routes())
        .with_state(state)
}
