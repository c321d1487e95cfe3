//! Router assembly and middleware

use super::handlers::{self, AppState};
use super::types::ShuttingDownResponse;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn, Instrument};

/// Header carrying the caller's correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Header carrying an opaque debug key
pub const DEBUG_KEY_HEADER: &str = "x-debug-key";

/// Build the router with all endpoints
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/payment/v2/{site}/{id}", post(handlers::payment_status))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn_with_state(state.clone(), shutdown_gate))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlate))
        .layer(cors)
        .with_state(state)
}

/// CORS policy: the listed origins, or any origin when none (or `*`) are listed
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Answer 503 for every request once shutdown has started
async fn shutdown_gate(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    if state.shutdown.is_shutting_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ShuttingDownResponse::default()),
        )
            .into_response();
    }
    next.run(req).await
}

/// Run the request inside a span tagged with its correlation id
async fn correlate(req: Request, next: Next) -> Response {
    let (correlation_id, debug_key) = {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let correlation_id =
            header(CORRELATION_HEADER).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let debug_key = header(DEBUG_KEY_HEADER).unwrap_or_default();
        (correlation_id, debug_key)
    };

    let span = info_span!(
        "request",
        correlation_id = %correlation_id,
        debug_key = %debug_key,
    );
    next.run(req).instrument(span).await
}
