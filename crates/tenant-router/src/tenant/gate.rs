//! Route authorization gate.
//!
//! The gate runs after tenant resolution and before dispatch. It receives the
//! already-resolved tenant and never derives a tenant itself. Access is granted
//! when the tenant is the default tenant, the caller holds the all-tenants
//! scope, or the configured tenant claim names the tenant. The audience claim
//! only grants a tenant when no tenant claim is configured. A configured claim
//! that is absent from the identity is always rejected.
//!
//! The capability statement route is not gated; see
//! [`crate::middleware::tenant`].

use std::sync::Arc;

use tracing::debug;

use crate::config::TenancyConfig;

use super::claims::IdentityClaims;
use super::policy::TenantPolicy;
use super::resolver::{ResolvedTenant, TenantError};
use super::source::TenantSource;

/// Allows or denies dispatch for a resolved tenant.
#[derive(Debug, Clone)]
pub struct TenantGate {
    policy: Arc<TenantPolicy>,
}

impl TenantGate {
    /// Creates a gate for the given configuration.
    pub fn new(config: &TenancyConfig) -> Self {
        Self::with_policy(Arc::new(TenantPolicy::new(config)))
    }

    /// Creates a gate sharing an existing policy.
    pub fn with_policy(policy: Arc<TenantPolicy>) -> Self {
        Self { policy }
    }

    /// Authorizes access to `resolved` for `identity`.
    pub fn authorize(
        &self,
        resolved: &ResolvedTenant,
        identity: &IdentityClaims,
    ) -> Result<(), TenantError> {
        let tenant = &resolved.tenant_id;

        if tenant.is_default() || self.policy.holds_all_tenants_scope(identity) {
            return Ok(());
        }

        let resolved_by_audience = resolved.source == TenantSource::AudienceClaim;
        match self.policy.claim_grants(identity, tenant) {
            Some(Ok(true)) => Ok(()),
            None if resolved_by_audience => Ok(()),
            Some(Err(missing)) => {
                debug!(claim = %missing.path, "Configured tenant claim is missing");
                Err(TenantError::MisconfiguredClaim {
                    claim: missing.path,
                })
            }
            Some(Ok(false)) | None => Err(TenantError::AccessDenied {
                tenant: tenant.to_string(),
            }),
        }
    }
}
