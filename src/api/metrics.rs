//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring and observability.

use axum::{Router, http::header, middleware, response::IntoResponse, routing::get};
use prometheus::{Encoder, TextEncoder};

use crate::AppState;
use crate::auth::require_auth;
use crate::error::AppError;
use crate::metrics::REGISTRY;

/// GET /metrics
///
/// Text exposition of [`REGISTRY`]; an encoding failure is an internal error.
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&REGISTRY.gather())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("metrics encoding: {e}")))?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], body))
}

/// Create metrics router
///
/// Exposes the `/metrics` endpoint behind the session guard.
pub fn metrics_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
