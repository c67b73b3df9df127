//! # helios-tenant-router - Multi-tenant routing for FHIR RESTful APIs
//!
//! This crate puts a tenant resolution and route authorization pipeline in
//! front of a [FHIR RESTful API](https://hl7.org/fhir/http.html). Tenants are
//! addressed by a URL segment, optionally preceded by a fixed prefix:
//!
//! ```text
//! https://fhir.example.com/tenant/t1/Patient/12345
//!                          ^^^^^^ ^^ ^^^^^^^^^^^^^
//!                          prefix |  canonical path
//!                              tenant
//! ```
//!
//! Each request is checked against the tenant-scoped URL grammar for its
//! method, the tenant is resolved from the caller's claims and authorized, and
//! only then is the request routed, on its canonical path, to a
//! [`ResourceHandler`]. Links in responses are rebuilt under the same tenant
//! base.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helios_tenant_router::{ServerConfig, create_app_with_config, init_logging, serve};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env();
//!     init_logging(&config.log_level);
//!
//!     let app = create_app_with_config(MyHandler::new(), config.clone());
//!     serve(app, &config).await
//! }
//! ```
//!
//! Claims are read from an [`IdentityClaims`](tenant::IdentityClaims) request
//! extension that an authentication layer in front of the router inserts.
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | read | GET | `/[tenant]/[type]/[id]` |
//! | vread | GET | `/[tenant]/[type]/[id]/_history/[vid]` |
//! | update | PUT | `/[tenant]/[type]/[id]` |
//! | patch | PATCH | `/[tenant]/[type]/[id]` |
//! | delete | DELETE | `/[tenant]/[type]/[id]` |
//! | create | POST | `/[tenant]/[type]` |
//! | search | GET | `/[tenant]/[type]?params` |
//! | capabilities | GET | `/[tenant]/metadata` |
//! | history (instance) | GET | `/[tenant]/[type]/[id]/_history` |
//! | history (type) | GET | `/[tenant]/[type]/_history` |
//! | history (system) | GET | `/[tenant]/_history` |
//! | batch/transaction | POST | `/[tenant]` |
//!
//! `[tenant]` is `{tenantId}` or `{prefix}/{tenantId}`, and is absent when
//! multi-tenancy is disabled.
//!
//! ## Error Handling
//!
//! All errors are returned as FHIR
//! [OperationOutcome](https://hl7.org/fhir/operationoutcome.html) resources:
//!
//! | HTTP Status | FHIR Issue Code | Description |
//! |-------------|-----------------|-------------|
//! | 400 | invalid | Malformed tenant route / validation error |
//! | 401 | security | Tenant not granted to the caller |
//! | 404 | not-found | Resource or route not found |
//! | 415 | not-supported | Unsupported media type |
//! | 429 | throttled | Handler concurrency limit, with `Retry-After` |
//! | 500 | exception | Internal server error |
//!
//! ## Architecture
//!
//! - [`tenant`] - Path grammar, tenant resolution, authorization and URL building
//! - [`middleware`] - The two tenancy stages as axum middleware
//! - [`routing`] - Route registration per routing mode
//! - [`handlers`] - HTTP request handlers for each interaction
//! - [`backend`] - The downstream [`ResourceHandler`] contract
//! - [`extractors`] - Axum extractors for tenant, identity, bodies and paging
//! - [`responses`] - Bundle, OperationOutcome and header generation
//! - [`config`] - Server and tenancy configuration
//! - [`error`] - Error types and status mapping
//! - [`state`] - Application state

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routing;
pub mod state;
pub mod tenant;

pub use backend::{HandlerError, HandlerResult, RequestContext, ResourceHandler};
pub use config::{ServerConfig, TenancyConfig, TenancyMode};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<H>(handler: H) -> Router
where
    H: ResourceHandler + 'static,
{
    create_app_with_config(handler, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenant_router::{ServerConfig, TenancyConfig, create_app_with_config};
///
/// let config = ServerConfig {
///     tenancy: TenancyConfig {
///         enabled: true,
///         tenant_url_part: Some("tenant".to_string()),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let app = create_app_with_config(MyHandler::new(), config);
/// ```
pub fn create_app_with_config<H>(handler: H, config: ServerConfig) -> Router
where
    H: ResourceHandler + 'static,
{
    info!(
        handler = handler.name(),
        mode = ?config.tenancy.mode(),
        "Creating tenant router"
    );

    let state = AppState::new(Arc::new(handler), config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = split_list(&config.cors_origins)
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = split_list(&config.cors_methods)
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = split_list(&config.cors_headers)
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` overrides
/// `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_tenant_router={},tower_http=debug", level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Validates `config`, binds its socket address and serves `app` until the
/// process is stopped.
pub async fn serve(app: Router, config: &ServerConfig) -> anyhow::Result<()> {
    if let Err(errors) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, base_url = %config.server_url(), "Tenant router listening");

    axum::serve(listener, app).await?;
    Ok(())
}
