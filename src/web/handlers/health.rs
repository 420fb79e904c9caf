//! # Health Handlers
//!
//! Public eligibility report and the internal surface followers read from.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::models::{HealthStatus, ProcessorRole};
use crate::services::HealthReport;
use crate::web::response_types::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Eligibility, role and queue depth: GET /health
pub async fn health_report(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.dispatch().health_report())
}

/// Raw snapshot for one processor: GET /internal/health/{processor}
///
/// Only answered while this replica probes the processors itself; followers
/// return 503 so a peer never relays relayed data.
pub async fn internal_health(
    State(state): State<Arc<AppState>>,
    Path(processor): Path<String>,
) -> ApiResult<Json<HealthStatus>> {
    let processor: ProcessorRole = processor.parse().map_err(|_| ApiError::NotFound)?;
    state
        .dispatch()
        .peer_snapshot(processor)
        .map(Json)
        .ok_or_else(|| ApiError::service_unavailable("replica is not acting as leader"))
}
