//! Tenant context extractor.
//!
//! Reads the [`ResolvedRequest`] left by the tenancy middleware and exposes the
//! resolved tenant and a matching [`TenantUrlContext`] to handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::backend::{RequestContext, ResourceHandler};
use crate::error::RestError;
use crate::state::AppState;
use crate::tenant::{IdentityClaims, ResolvedRequest, TenantId, TenantUrlContext};

/// Axum extractor for the request's tenant.
///
/// With multi-tenancy disabled the tenant is absent and URLs are unqualified.
/// With it enabled every gated route carries the authorized tenant; the
/// capability statement carries none but still builds URLs under the tenant
/// segment the client used.
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenant_router::extractors::TenantExtractor;
///
/// async fn handler(tenant: TenantExtractor) {
///     println!("Tenant: {:?}, base: {}", tenant.tenant_id(), tenant.urls().base_url());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TenantExtractor {
    tenant_id: Option<TenantId>,
    urls: TenantUrlContext,
}

impl TenantExtractor {
    /// Creates an extractor value directly.
    pub fn new(tenant_id: Option<TenantId>, urls: TenantUrlContext) -> Self {
        Self { tenant_id, urls }
    }

    /// Returns the authorized tenant, if any.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// Returns the URL context for building response links.
    pub fn urls(&self) -> &TenantUrlContext {
        &self.urls
    }

    /// Builds the handler context for this request.
    pub fn request_context(&self, identity: IdentityClaims) -> RequestContext {
        RequestContext::new(self.tenant_id.clone(), identity)
    }
}

impl std::fmt::Display for TenantExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tenant_id {
            Some(tenant) => write!(f, "{}", tenant),
            None => write!(f, "-"),
        }
    }
}

impl<H> FromRequestParts<AppState<H>> for TenantExtractor
where
    H: ResourceHandler + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<H>,
    ) -> Result<Self, Self::Rejection> {
        let enabled = state.tenancy_mode().is_enabled();

        let Some(resolved) = parts.extensions.get::<ResolvedRequest>() else {
            if enabled {
                return Err(RestError::InternalError {
                    message: format!("no tenant route recorded for {}", parts.uri.path()),
                });
            }
            return Ok(Self::new(None, state.url_context(None)));
        };

        let tenant_id = resolved.tenant().map(|t| t.tenant_id.clone());
        if tenant_id.is_none() && !resolved.tenant_path().is_metadata() {
            return Err(RestError::InternalError {
                message: format!("tenant not authorized for {}", resolved.raw_path()),
            });
        }

        let url_tenant = tenant_id
            .as_ref()
            .map(TenantId::as_str)
            .unwrap_or_else(|| resolved.path_tenant());
        let urls = state.url_context(Some(url_tenant));

        Ok(Self::new(tenant_id, urls))
    }
}
