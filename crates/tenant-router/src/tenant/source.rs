//! Tenant grant identification.
//!
//! Records which rule accepted the tenant for a request.

use std::fmt;

/// The rule that granted access to the resolved tenant.
///
/// Variants are listed in the order the resolver evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenantSource {
    /// The path addressed the default tenant.
    DefaultTenant,
    /// The caller holds the configured all-tenants scope.
    AllTenantsScope,
    /// The configured custom claim lists or names the tenant.
    CustomClaim,
    /// The audience claim names the tenant.
    AudienceClaim,
}

impl TenantSource {
    /// Returns `true` if the grant does not depend on a tenant-specific claim.
    pub fn is_unconditional(&self) -> bool {
        matches!(
            self,
            TenantSource::DefaultTenant | TenantSource::AllTenantsScope
        )
    }
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantSource::DefaultTenant => write!(f, "default_tenant"),
            TenantSource::AllTenantsScope => write!(f, "all_tenants_scope"),
            TenantSource::CustomClaim => write!(f, "custom_claim"),
            TenantSource::AudienceClaim => write!(f, "audience_claim"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(TenantSource::DefaultTenant.to_string(), "default_tenant");
        assert_eq!(TenantSource::AllTenantsScope.to_string(), "all_tenants_scope");
        assert_eq!(TenantSource::CustomClaim.to_string(), "custom_claim");
        assert_eq!(TenantSource::AudienceClaim.to_string(), "audience_claim");
    }

    #[test]
    fn test_unconditional() {
        assert!(TenantSource::DefaultTenant.is_unconditional());
        assert!(TenantSource::AllTenantsScope.is_unconditional());
        assert!(!TenantSource::CustomClaim.is_unconditional());
        assert!(!TenantSource::AudienceClaim.is_unconditional());
    }
}
