//! # Payment Handlers
//!
//! Ingestion plus the reporting endpoints over committed payments.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::{PaymentRequest, PaymentSummary};
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

/// Queue a payment: POST /payments
///
/// Returns 202 as soon as the task is queued; settlement happens later.
pub async fn submit_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let correlation_id = state.dispatch().submit(request)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "correlationId": correlation_id })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Committed totals per processor: GET /payments-summary?from=&to=
pub async fn payments_summary(
    State(state): State<Arc<AppState>>,
    Query(range): Query<SummaryQuery>,
) -> ApiResult<Json<PaymentSummary>> {
    let summary = state.ledger().summary(range.from, range.to).await?;
    Ok(Json(summary))
}

/// Drop every committed record: POST /purge-payments
pub async fn purge_payments(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let removed = state.ledger().purge().await?;
    Ok(Json(json!({ "removed": removed })))
}
