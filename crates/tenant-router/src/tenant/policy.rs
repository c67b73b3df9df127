//! Claim-based tenant grants shared by the resolver and the gate.

use crate::config::TenancyConfig;

use super::claims::{ClaimValue, IdentityClaims, MissingClaim};
use super::id::TenantId;

/// The configured ways a caller can be granted a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantPolicy {
    claim_path: Option<String>,
    claim_value_prefix: Option<String>,
    all_tenants_scope: Option<String>,
}

impl TenantPolicy {
    /// Builds the policy from the tenancy configuration.
    pub fn new(config: &TenancyConfig) -> Self {
        Self {
            claim_path: config.tenant_claim_path.clone(),
            claim_value_prefix: config.tenant_claim_value_prefix.clone(),
            all_tenants_scope: config.all_tenants_scope.clone(),
        }
    }

    /// Returns the configured tenant claim path.
    pub fn claim_path(&self) -> Option<&str> {
        self.claim_path.as_deref()
    }

    /// Returns the configured all-tenants scope.
    pub fn all_tenants_scope(&self) -> Option<&str> {
        self.all_tenants_scope.as_deref()
    }

    /// Returns `true` if the identity holds the all-tenants scope.
    pub fn holds_all_tenants_scope(&self, identity: &IdentityClaims) -> bool {
        self.all_tenants_scope
            .as_deref()
            .is_some_and(|scope| identity.has_scope(scope))
    }

    /// Returns the entry that must appear in the tenant claim for `tenant`.
    pub fn expected_claim_value(&self, tenant: &str) -> String {
        match &self.claim_value_prefix {
            Some(prefix) => format!("{}{}", prefix, tenant),
            None => tenant.to_string(),
        }
    }

    /// Strips the configured claim value prefix from a single claim value.
    pub fn strip_claim_value_prefix<'a>(&self, value: &'a str) -> &'a str {
        self.claim_value_prefix
            .as_deref()
            .and_then(|prefix| value.strip_prefix(prefix))
            .unwrap_or(value)
    }

    /// Looks up the configured tenant claim.
    ///
    /// Returns `None` when no claim path is configured.
    pub fn tenant_claim<'a>(
        &self,
        identity: &'a IdentityClaims,
    ) -> Option<Result<ClaimValue<'a>, MissingClaim>> {
        self.claim_path.as_deref().map(|path| identity.claim(path))
    }

    /// Checks whether the tenant claim grants `tenant`.
    ///
    /// Returns `None` when no claim path is configured.
    pub fn claim_grants(
        &self,
        identity: &IdentityClaims,
        tenant: &TenantId,
    ) -> Option<Result<bool, MissingClaim>> {
        let expected = self.expected_claim_value(tenant.as_str());
        self.tenant_claim(identity).map(|claim| {
            claim.map(|value| match value {
                ClaimValue::List(entries) => entries.contains(&expected.as_str()),
                ClaimValue::Text(single) => {
                    self.strip_claim_value_prefix(single) == tenant.as_str()
                }
                ClaimValue::Other(_) => false,
            })
        })
    }
}
