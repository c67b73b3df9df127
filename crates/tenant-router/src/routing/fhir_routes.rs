//! FHIR route registration.
//!
//! Handlers are registered once, on canonical paths. The routing mode decides
//! what sits in front of them:
//!
//! - [`TenancyMode::Disabled`]: the canonical routes are served directly.
//! - [`TenancyMode::EnabledNoPrefix`] and [`TenancyMode::EnabledWithPrefix`]:
//!   every request first passes
//!   [`strip_tenant_prefix_middleware`](crate::middleware::strip_tenant_prefix_middleware)
//!   (grammar check and rewrite to the canonical path), then
//!   [`authorize_tenant_middleware`](crate::middleware::authorize_tenant_middleware),
//!   and is only then routed.
//!
//! `GET /health` is served outside the tenant routes in every mode.

use axum::{
    Router,
    extract::Request,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tracing::info;

use crate::backend::ResourceHandler;
use crate::config::TenancyMode;
use crate::error::RestError;
use crate::handlers;
use crate::middleware::{authorize_tenant_middleware, strip_tenant_prefix_middleware};
use crate::state::AppState;

/// Creates the application routes for the configured routing mode.
///
/// # Routes
///
/// ## System-level
/// - `GET /metadata` - CapabilityStatement
/// - `GET /health` - Health check
/// - `GET /_history` - System history
/// - `POST /` - Batch/Transaction
/// - `GET /$export`, `GET|DELETE /$export/{job_id}` - 501 Not Implemented
///
/// ## Type-level
/// - `GET /{type}` - Search
/// - `POST /{type}` - Create
/// - `GET /{type}/_history` - Type history
///
/// ## Instance-level
/// - `GET /{type}/{id}` - Read
/// - `PUT /{type}/{id}` - Update
/// - `PATCH /{type}/{id}` - Patch
/// - `DELETE /{type}/{id}` - Delete
/// - `GET /{type}/{id}/_history` - Instance history
/// - `GET /{type}/{id}/_history/{vid}` - Version read
///
/// In the enabled modes each of these except `/health` is reached as
/// `/[prefix/]{tenantId}{path}`.
pub fn create_routes<H>(state: AppState<H>) -> Router
where
    H: ResourceHandler + 'static,
{
    let health = Router::new()
        .route("/health", get(handlers::health_handler::<H>))
        .with_state(state.clone());

    let mode = state.tenancy_mode().clone();
    let pipeline = state.tenancy_arc();
    let canonical = canonical_routes(state);

    match mode {
        TenancyMode::Disabled => {
            info!("Multi-tenancy disabled, serving canonical routes");
            health.merge(canonical)
        }
        TenancyMode::EnabledNoPrefix | TenancyMode::EnabledWithPrefix(_) => {
            info!(
                prefix = mode.prefix().unwrap_or("-"),
                "Multi-tenancy enabled, serving tenant-scoped routes"
            );
            // The last layer added runs first.
            let tenant_routes = Router::new()
                .fallback_service(canonical)
                .layer(from_fn_with_state(
                    pipeline.clone(),
                    authorize_tenant_middleware,
                ))
                .layer(from_fn_with_state(pipeline, strip_tenant_prefix_middleware));
            health.fallback_service(tenant_routes)
        }
    }
}

/// Creates the canonical resource routes with a 404 fallback.
pub fn canonical_routes<H>(state: AppState<H>) -> Router
where
    H: ResourceHandler + 'static,
{
    Router::new()
        // System-level routes
        .route("/metadata", get(handlers::capabilities_handler::<H>))
        .route("/_history", get(handlers::history_system_handler::<H>))
        .route("/", post(handlers::batch_handler::<H>))
        // Bulk export is reserved by the tenant grammar but not served here
        .route("/$export", get(export_not_implemented))
        .route(
            "/$export/{job_id}",
            get(export_not_implemented).delete(export_not_implemented),
        )
        // Type-level routes
        .route(
            "/{resource_type}",
            get(handlers::search_handler::<H>).post(handlers::create_handler::<H>),
        )
        .route(
            "/{resource_type}/_history",
            get(handlers::history_type_handler::<H>),
        )
        // Instance-level routes
        .route(
            "/{resource_type}/{id}",
            get(handlers::read_handler::<H>)
                .put(handlers::update_handler::<H>)
                .patch(handlers::patch_handler::<H>)
                .delete(handlers::delete_handler::<H>),
        )
        .route(
            "/{resource_type}/{id}/_history",
            get(handlers::history_instance_handler::<H>),
        )
        .route(
            "/{resource_type}/{id}/_history/{version_id}",
            get(handlers::vread_handler::<H>),
        )
        .fallback(route_not_found)
        .with_state(state)
}

async fn export_not_implemented() -> RestError {
    RestError::NotImplemented {
        feature: "$export".to_string(),
    }
}

async fn route_not_found(request: Request) -> RestError {
    RestError::RouteNotFound {
        path: request.uri().path().to_string(),
    }
}
