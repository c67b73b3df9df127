//! The per-router tenancy pipeline.
//!
//! A [`TenancyPipeline`] is built once by the composition root from the server
//! configuration and handed to the middleware as shared, immutable state.
//! Separate routers (in tests, for example) each own their own pipeline.

use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::config::{ServerConfig, TenancyMode};

use super::claims::IdentityClaims;
use super::gate::TenantGate;
use super::grammar::{RouteError, TenantPath, validate_tenant_path};
use super::policy::TenantPolicy;
use super::resolver::{ResolvedTenant, TenantError, TenantResolver};
use super::url::TenantUrlContext;

/// Validation, resolution and authorization bound to one routing mode.
#[derive(Debug, Clone)]
pub struct TenancyPipeline {
    mode: TenancyMode,
    resolver: TenantResolver,
    gate: TenantGate,
    server_url: String,
}

impl TenancyPipeline {
    /// Builds the pipeline from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        let policy = Arc::new(TenantPolicy::new(&config.tenancy));
        Self {
            mode: config.tenancy.mode(),
            resolver: TenantResolver::with_policy(Arc::clone(&policy), config.server_url()),
            gate: TenantGate::with_policy(policy),
            server_url: config.server_url().to_string(),
        }
    }

    /// Returns the routing mode.
    pub fn mode(&self) -> &TenancyMode {
        &self.mode
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    /// Returns the gate.
    pub fn gate(&self) -> &TenantGate {
        &self.gate
    }

    /// Validates the request path.
    ///
    /// Returns `Ok(None)` when multi-tenancy is disabled.
    pub fn validate_route(
        &self,
        method: &Method,
        raw_path: &str,
    ) -> Result<Option<TenantPath>, RouteError> {
        if !self.mode.is_enabled() {
            return Ok(None);
        }
        validate_tenant_path(method, raw_path, self.mode.prefix()).map(Some)
    }

    /// Resolves and authorizes the tenant of a validated path.
    ///
    /// The capability statement is exempt and yields `Ok(None)`.
    pub fn authorize(
        &self,
        path: &TenantPath,
        identity: &IdentityClaims,
    ) -> Result<Option<ResolvedTenant>, TenantError> {
        if path.is_metadata() {
            debug!(tenant = %path.tenant, "Capability statement is not tenant gated");
            return Ok(None);
        }

        let resolved = self.resolver.resolve(&path.tenant, identity)?;
        self.gate.authorize(&resolved, identity)?;
        Ok(Some(resolved))
    }

    /// Returns the URL context for `tenant_id`.
    pub fn url_context(&self, tenant_id: Option<&str>) -> TenantUrlContext {
        TenantUrlContext::new(&self.server_url, tenant_id, &self.mode)
    }
}

/// What the pipeline knows about one request.
///
/// Stored in the request extensions by the path validation middleware. The
/// canonical path is fixed at construction and the tenant can be set once.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    method: Method,
    raw_path: String,
    path: TenantPath,
    tenant: Option<ResolvedTenant>,
}

impl ResolvedRequest {
    /// Records a validated request.
    pub fn new(method: Method, raw_path: impl Into<String>, path: TenantPath) -> Self {
        Self {
            method,
            raw_path: raw_path.into(),
            path,
            tenant: None,
        }
    }

    /// Attaches the resolved tenant. A tenant that is already set is kept.
    pub fn with_tenant(mut self, tenant: ResolvedTenant) -> Self {
        debug_assert!(self.tenant.is_none(), "tenant resolved twice");
        self.tenant.get_or_insert(tenant);
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path as received, including tenant segments.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Returns the path with tenant segments removed.
    pub fn canonical_path(&self) -> &str {
        &self.path.canonical_path
    }

    /// Returns the tenant segment from the URL.
    pub fn path_tenant(&self) -> &str {
        &self.path.tenant
    }

    /// Returns the validated path.
    pub fn tenant_path(&self) -> &TenantPath {
        &self.path
    }

    /// Returns the resolved tenant, absent for ungated routes.
    pub fn tenant(&self) -> Option<&ResolvedTenant> {
        self.tenant.as_ref()
    }
}
