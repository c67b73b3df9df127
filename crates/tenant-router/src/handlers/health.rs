//! Health check endpoint handler.
//!
//! Served at `/health` outside the tenant routes, so probes need neither a
//! tenant segment nor claims.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
pub async fn health_handler<H>(State(state): State<AppState<H>>) -> Response
where
    H: ResourceHandler + 'static,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "handler": state.handler().name(),
        "multitenancy": state.tenancy_mode().is_enabled(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(health_response)).into_response()
}
