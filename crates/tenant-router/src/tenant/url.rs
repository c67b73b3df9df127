//! Tenant-qualified URL construction.
//!
//! Links emitted in responses (`Location`, Bundle `self`/`next`/`previous`,
//! entry `fullUrl`) must address the same tenant-scoped base the client used.
//! [`build_tenant_url`] produces the tenant fragment and [`TenantUrlContext`]
//! applies it to the server base URL.

use crate::config::TenancyMode;

/// Returns the tenant URL fragment, `"{prefix}/{tenantId}"` or `"{tenantId}"`.
///
/// Returns `None` when no tenant is in play, which leaves links untouched.
///
/// # Examples
///
/// ```
/// use helios_tenant_router::tenant::build_tenant_url;
///
/// assert_eq!(build_tenant_url(Some("t1"), Some("tenant")).as_deref(), Some("tenant/t1"));
/// assert_eq!(build_tenant_url(Some("t1"), None).as_deref(), Some("t1"));
/// assert_eq!(build_tenant_url(None, Some("tenant")), None);
/// ```
pub fn build_tenant_url(tenant_id: Option<&str>, tenant_url_part: Option<&str>) -> Option<String> {
    let tenant_id = tenant_id?;
    Some(match tenant_url_part {
        Some(prefix) => format!("{}/{}", prefix, tenant_id),
        None => tenant_id.to_string(),
    })
}

/// Per-request context for building tenant-qualified URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantUrlContext {
    server_url: String,
    tenant_id: Option<String>,
    tenant_url_part: Option<String>,
}

impl TenantUrlContext {
    /// Creates a context for `tenant_id` under the given routing mode.
    ///
    /// In [`TenancyMode::Disabled`] the tenant is ignored.
    pub fn new(server_url: &str, tenant_id: Option<&str>, mode: &TenancyMode) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            tenant_id: tenant_id
                .filter(|_| mode.is_enabled())
                .map(str::to_string),
            tenant_url_part: mode.prefix().map(str::to_string),
        }
    }

    /// Creates a context without any tenant.
    pub fn untenanted(server_url: &str) -> Self {
        Self::new(server_url, None, &TenancyMode::Disabled)
    }

    /// Returns the tenant the URLs are qualified with.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Returns the tenant URL fragment.
    pub fn tenant_fragment(&self) -> Option<String> {
        build_tenant_url(self.tenant_id.as_deref(), self.tenant_url_part.as_deref())
    }

    /// Returns the tenant-qualified service base, e.g.
    /// `https://fhir.example.com/tenant/t1`.
    pub fn base_url(&self) -> String {
        match self.tenant_fragment() {
            Some(fragment) => format!("{}/{}", self.server_url, fragment),
            None => self.server_url.clone(),
        }
    }

    /// Returns the URL of a canonical path such as `/Patient/1`.
    pub fn url_for(&self, canonical_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url(),
            canonical_path.trim_start_matches('/')
        )
    }

    /// Returns `[base]/[type]`.
    pub fn type_url(&self, resource_type: &str) -> String {
        format!("{}/{}", self.base_url(), resource_type)
    }

    /// Returns `[base]/[type]/[id]`.
    pub fn resource_url(&self, resource_type: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url(), resource_type, id)
    }

    /// Returns `[base]/[type]/[id]/_history/[vid]`.
    pub fn version_url(&self, resource_type: &str, id: &str, version_id: &str) -> String {
        format!(
            "{}/{}/{}/_history/{}",
            self.base_url(),
            resource_type,
            id,
            version_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: &str = "https://fhir.example.com";

    fn prefixed() -> TenancyMode {
        TenancyMode::EnabledWithPrefix("tenant".to_string())
    }

    #[test]
    fn test_build_tenant_url() {
        assert_eq!(
            build_tenant_url(Some("t1"), Some("tenant")),
            Some("tenant/t1".to_string())
        );
        assert_eq!(build_tenant_url(Some("t1"), None), Some("t1".to_string()));
        assert_eq!(build_tenant_url(None, None), None);
    }

    #[test]
    fn test_fragment_starts_with_prefix() {
        for tenant in ["a", "DEFAULT", "915b76f7-8744-4010-bd31-a1e4c0d9fc64"] {
            let url = build_tenant_url(Some(tenant), Some("tenant")).unwrap();
            assert!(url.starts_with("tenant/"));
            assert_eq!(build_tenant_url(Some(tenant), None).unwrap(), tenant);
        }
    }

    #[test]
    fn test_context_prefixed() {
        let ctx = TenantUrlContext::new(SERVER, Some("t1"), &prefixed());
        assert_eq!(ctx.tenant_fragment().as_deref(), Some("tenant/t1"));
        assert_eq!(ctx.base_url(), "https://fhir.example.com/tenant/t1");
        assert_eq!(
            ctx.resource_url("Patient", "1"),
            "https://fhir.example.com/tenant/t1/Patient/1"
        );
        assert_eq!(
            ctx.version_url("Patient", "1", "2"),
            "https://fhir.example.com/tenant/t1/Patient/1/_history/2"
        );
        assert_eq!(
            ctx.url_for("/Patient/_history"),
            "https://fhir.example.com/tenant/t1/Patient/_history"
        );
    }

    #[test]
    fn test_context_unprefixed() {
        let ctx = TenantUrlContext::new(SERVER, Some("t1"), &TenancyMode::EnabledNoPrefix);
        assert_eq!(ctx.type_url("Patient"), "https://fhir.example.com/t1/Patient");
    }

    #[test]
    fn test_context_disabled_ignores_tenant() {
        let ctx = TenantUrlContext::new(
            "https://fhir.example.com/",
            Some("t1"),
            &TenancyMode::Disabled,
        );
        assert_eq!(ctx.tenant_id(), None);
        assert_eq!(ctx.tenant_fragment(), None);
        assert_eq!(ctx.type_url("Patient"), "https://fhir.example.com/Patient");
        assert_eq!(ctx, TenantUrlContext::untenanted(SERVER));
    }
}
