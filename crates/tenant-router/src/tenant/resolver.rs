//! Tenant resolution from the caller's identity.
//!
//! Provides the [`TenantResolver`], which decides the authoritative tenant of a
//! request from the tenant segment in the URL and the caller's claims.
//!
//! # Decision order
//!
//! 1. The path addresses [`DEFAULT_TENANT`](super::DEFAULT_TENANT): accepted.
//! 2. The caller holds the all-tenants scope: the path tenant is accepted.
//! 3. The custom tenant claim is a list containing the (prefixed) path tenant:
//!    accepted.
//! 4. A tenant is read from the audience claim. Audience values of the form
//!    `{server_url}/tenant/{tenantId}` are collected; more than one distinct
//!    tenant fails.
//! 5. If both the custom claim and the audience produced a tenant they must
//!    agree; if neither did the request fails. A configured claim that is
//!    missing from the identity fails as [`TenantError::MisconfiguredClaim`].
//! 6. The chosen tenant must be a valid tenant ID equal to the path tenant.
//!
//! Every failure is closed: there is no fallback tenant.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::TenancyConfig;

use super::claims::{ClaimValue, IdentityClaims};
use super::id::{DEFAULT_TENANT, TenantId, is_valid_tenant_id};
use super::policy::TenantPolicy;
use super::source::TenantSource;

/// Path that separates the server URL from the tenant ID in audience values.
pub const AUDIENCE_TENANT_PATH: &str = "/tenant/";

/// Result of resolving the tenant of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    /// The resolved tenant ID.
    pub tenant_id: TenantId,
    /// The rule that granted the tenant.
    pub source: TenantSource,
}

impl ResolvedTenant {
    /// Returns the tenant ID as a string reference.
    pub fn tenant_id_str(&self) -> &str {
        self.tenant_id.as_str()
    }
}

/// Tenant resolution and authorization failures.
///
/// Display strings are returned to callers, so they never contain claim
/// values. Only the denied tenant and the misconfigured claim name appear.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantError {
    /// No claim establishes the requested tenant, or claims disagree.
    #[error("Unauthorized")]
    Unauthorized,

    /// The audience claim names more than one tenant.
    #[error("Unauthorized")]
    AmbiguousAudience,

    /// The resolved tenant is not granted to the caller.
    #[error("Unauthorized: No permission included in access token in order to access {tenant}")]
    AccessDenied {
        /// The denied tenant.
        tenant: String,
    },

    /// The configured tenant claim is absent from the identity.
    #[error("Unauthorized wrong token claim {claim}")]
    MisconfiguredClaim {
        /// The configured claim path.
        claim: String,
    },
}

/// Resolves the tenant of a request.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    policy: Arc<TenantPolicy>,
    audience_prefix: String,
}

impl TenantResolver {
    /// Creates a resolver for the given configuration.
    ///
    /// `server_url` is the public base URL used to recognize tenant audiences.
    pub fn new(config: &TenancyConfig, server_url: &str) -> Self {
        Self::with_policy(Arc::new(TenantPolicy::new(config)), server_url)
    }

    /// Creates a resolver sharing an existing policy.
    pub fn with_policy(policy: Arc<TenantPolicy>, server_url: &str) -> Self {
        Self {
            policy,
            audience_prefix: format!(
                "{}{}",
                server_url.trim_end_matches('/'),
                AUDIENCE_TENANT_PATH
            ),
        }
    }

    /// Returns the audience prefix, e.g. `https://fhir.example.com/tenant/`.
    pub fn audience_prefix(&self) -> &str {
        &self.audience_prefix
    }

    /// Resolves the tenant for `path_tenant`, the tenant segment of the URL.
    pub fn resolve(
        &self,
        path_tenant: &str,
        identity: &IdentityClaims,
    ) -> Result<ResolvedTenant, TenantError> {
        if path_tenant == DEFAULT_TENANT {
            return Ok(ResolvedTenant {
                tenant_id: TenantId::default_tenant(),
                source: TenantSource::DefaultTenant,
            });
        }

        let requested = TenantId::parse(path_tenant).map_err(|_| TenantError::Unauthorized)?;

        if self.policy.holds_all_tenants_scope(identity) {
            return Ok(ResolvedTenant {
                tenant_id: requested,
                source: TenantSource::AllTenantsScope,
            });
        }

        let custom = self.policy.tenant_claim(identity);
        if let Some(Ok(ClaimValue::List(entries))) = &custom {
            let expected = self.policy.expected_claim_value(requested.as_str());
            if entries.contains(&expected.as_str()) {
                return Ok(ResolvedTenant {
                    tenant_id: requested,
                    source: TenantSource::CustomClaim,
                });
            }
        }

        let from_audience = self.audience_tenant(identity)?;
        let from_custom = match &custom {
            Some(Ok(ClaimValue::Text(value))) if !value.is_empty() => {
                Some(self.policy.strip_claim_value_prefix(*value))
            }
            // A list that did not contain the tenant, or a non-string claim.
            Some(Ok(_)) => {
                trace!("Custom tenant claim does not name the requested tenant");
                return Err(TenantError::Unauthorized);
            }
            _ => None,
        };

        let (claimed, source) = match (from_custom, from_audience) {
            (Some(custom_tenant), Some(audience_tenant)) if custom_tenant != audience_tenant => {
                debug!("Custom claim and audience name different tenants");
                return Err(TenantError::Unauthorized);
            }
            (Some(custom_tenant), _) => (custom_tenant, TenantSource::CustomClaim),
            (None, Some(audience_tenant)) => (audience_tenant, TenantSource::AudienceClaim),
            (None, None) => {
                return Err(match custom {
                    Some(Err(missing)) => TenantError::MisconfiguredClaim {
                        claim: missing.path,
                    },
                    _ => TenantError::Unauthorized,
                });
            }
        };

        if !is_valid_tenant_id(claimed) || claimed != requested.as_str() {
            return Err(TenantError::Unauthorized);
        }

        Ok(ResolvedTenant {
            tenant_id: requested,
            source,
        })
    }

    /// Extracts the tenant named by the audience claim.
    ///
    /// Returns `Ok(None)` when no audience value carries a tenant and
    /// [`TenantError::AmbiguousAudience`] when several distinct tenants appear.
    pub fn audience_tenant<'a>(
        &self,
        identity: &'a IdentityClaims,
    ) -> Result<Option<&'a str>, TenantError> {
        let mut found: Option<&str> = None;
        for tenant in identity
            .audience()
            .into_iter()
            .filter_map(|aud| aud.strip_prefix(self.audience_prefix.as_str()))
        {
            match found {
                Some(existing) if existing != tenant => return Err(TenantError::AmbiguousAudience),
                _ => found = Some(tenant),
            }
        }
        Ok(found)
    }
}
