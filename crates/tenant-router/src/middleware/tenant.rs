//! Tenant resolution and authorization middleware.
//!
//! The second tenancy stage. It reads the [`ResolvedRequest`] written by
//! [`strip_tenant_prefix_middleware`](super::strip_tenant_prefix_middleware)
//! and the caller's [`IdentityClaims`] extension, which an upstream
//! authentication layer is expected to insert. A request without claims is
//! treated as anonymous.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::error::RestError;
use crate::tenant::{IdentityClaims, ResolvedRequest, TenancyPipeline};

/// Middleware that resolves the effective tenant and checks the caller may
/// access it.
///
/// On success the tenant is written into the request's [`ResolvedRequest`].
/// On failure the request is answered with 401 and the handler never runs.
pub async fn authorize_tenant_middleware(
    State(pipeline): State<Arc<TenancyPipeline>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(resolved) = request.extensions_mut().remove::<ResolvedRequest>() else {
        return next.run(request).await;
    };

    let identity = request
        .extensions()
        .get::<IdentityClaims>()
        .cloned()
        .unwrap_or_default();

    match pipeline.authorize(resolved.tenant_path(), &identity) {
        Ok(Some(tenant)) => {
            debug!(
                method = %resolved.method(),
                path = %resolved.raw_path(),
                tenant = %tenant.tenant_id,
                source = %tenant.source,
                "Authorized tenant"
            );
            request.extensions_mut().insert(resolved.with_tenant(tenant));
        }
        Ok(None) => {
            request.extensions_mut().insert(resolved);
        }
        Err(e) => {
            warn!(
                method = %resolved.method(),
                path = %resolved.raw_path(),
                tenant = %resolved.path_tenant(),
                subject = identity.subject().unwrap_or("-"),
                "Tenant authorization failed"
            );
            return RestError::from(e).into_response();
        }
    }

    next.run(request).await
}
