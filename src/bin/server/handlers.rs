//! HTTP Handlers for the Payment Status Server
//!
//! The business endpoint always answers 200 with an envelope; only the
//! operator-facing `/health` endpoint reports failures through its status
//! code.

use super::types::HealthResponse;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use payment_status::metrics::{LookupMetrics, CONTENT_TYPE};
use payment_status::services::{check_store, ShutdownController};
use payment_status::store::TransactionStore;
use payment_status::{LookupOutcome, LookupResolver, StatusEnvelope};
use std::sync::Arc;
use tracing::{error, warn};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state
pub struct AppState {
    pub resolver: LookupResolver,
    pub store: Arc<dyn TransactionStore>,
    pub metrics: Arc<LookupMetrics>,
    pub shutdown: ShutdownController,
}

// =============================================================================
// Payment Handlers
// =============================================================================

/// `POST /api/payment/v2/{site}/{id}`
pub async fn payment_status(
    State(state): State<Arc<AppState>>,
    Path((site, id)): Path<(String, String)>,
) -> Json<StatusEnvelope> {
    let outcome = state.resolver.resolve(&site, &id).await;
    if let LookupOutcome::Failed { reason } = &outcome {
        error!(site = %site, id = %id, error = %reason, "Lookup failed, answering pending");
    }
    Json(outcome.into_envelope())
}

// =============================================================================
// Health & Metrics Handlers
// =============================================================================

/// `GET /health`: one store ping
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check = check_store(state.store.as_ref()).await;
    if check.passed {
        (StatusCode::OK, Json(HealthResponse::healthy(check.latency_ms())))
    } else {
        let message = check.message.unwrap_or_default();
        warn!(error = %message, "Health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::unhealthy(message)),
        )
    }
}

/// `GET /metrics`: Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.export() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body),
        Err(e) => {
            error!(error = %e, "Metrics export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}
