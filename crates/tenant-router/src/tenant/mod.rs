//! Tenant resolution and route authorization.
//!
//! In a multi-tenant deployment every request passes through four steps before
//! it reaches a resource handler:
//!
//! 1. **Path grammar** ([`validate_tenant_path`]): the URL must have the shape
//!    `/[{prefix}/]{tenantId}/{ResourceType}/...` permitted for its method. The
//!    tenant segments are stripped to form the canonical path.
//! 2. **Resolution** ([`TenantResolver`]): the tenant in the URL is checked
//!    against the caller's claims (default tenant, all-tenants scope, custom
//!    tenant claim, audience).
//! 3. **Authorization** ([`TenantGate`]): the resolved tenant must be granted
//!    to the caller. `/metadata` bypasses steps 2 and 3.
//! 4. **URL re-qualification** ([`TenantUrlContext`]): links in the response
//!    are built under the same tenant base.
//!
//! The [`TenancyPipeline`] bundles these steps for one [`TenancyMode`]; the
//! middleware in [`crate::middleware`] runs it for each request.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use helios_tenant_router::{ServerConfig, TenancyConfig};
//! use helios_tenant_router::tenant::{IdentityClaims, TenancyPipeline};
//! use serde_json::json;
//!
//! let config = ServerConfig {
//!     base_url: "https://fhir.example.com".to_string(),
//!     tenancy: TenancyConfig {
//!         enabled: true,
//!         tenant_url_part: Some("tenant".to_string()),
//!         tenant_claim_path: Some("cognito:groups".to_string()),
//!         tenant_claim_value_prefix: Some("tenantprefix:".to_string()),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let pipeline = TenancyPipeline::from_config(&config);
//!
//! let path = pipeline
//!     .validate_route(&Method::GET, "/tenant/t1/Patient/12345")
//!     .unwrap()
//!     .unwrap();
//! let caller = IdentityClaims::from_value(json!({
//!     "cognito:groups": ["tenantprefix:t1"]
//! }))
//! .unwrap();
//! let resolved = pipeline.authorize(&path, &caller).unwrap().unwrap();
//!
//! assert_eq!(path.canonical_path, "/Patient/12345");
//! assert_eq!(resolved.tenant_id_str(), "t1");
//! ```

mod claims;
mod gate;
mod grammar;
mod id;
mod pipeline;
mod policy;
mod resolver;
mod source;
mod url;

pub use claims::{ClaimValue, IdentityClaims, MissingClaim};
pub use gate::TenantGate;
pub use grammar::{
    EXPORT_SEGMENT, HISTORY_SEGMENT, METADATA_SEGMENT, RouteError, TenantPath, expected_grammar,
    is_resource_type, validate_tenant_path,
};
pub use id::{DEFAULT_TENANT, InvalidTenantId, MAX_TENANT_ID_LEN, TenantId, is_valid_tenant_id};
pub use pipeline::{ResolvedRequest, TenancyPipeline};
pub use policy::TenantPolicy;
pub use resolver::{AUDIENCE_TENANT_PATH, ResolvedTenant, TenantError, TenantResolver};
pub use source::TenantSource;
pub use url::{TenantUrlContext, build_tenant_url};
