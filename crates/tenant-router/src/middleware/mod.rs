//! Middleware for the tenant router.
//!
//! - [`tenant_prefix`] - Validates the tenant route and rewrites it to the canonical path
//! - [`tenant`] - Resolves and authorizes the tenant

pub mod tenant;
pub mod tenant_prefix;

pub use tenant::authorize_tenant_middleware;
pub use tenant_prefix::strip_tenant_prefix_middleware;
