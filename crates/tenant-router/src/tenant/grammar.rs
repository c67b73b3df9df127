//! Tenant-scoped URL grammar.
//!
//! Every request in a multi-tenant deployment addresses
//! `/[{prefix}/]{tenantId}/{ResourceType}[/{id}[/_history[/{vid}]]]`. The
//! validator checks that shape per HTTP method and produces the canonical path,
//! which is the same URL with the prefix and tenant segments removed.
//!
//! | Method | Accepted shapes after the tenant segment |
//! |--------|------------------------------------------|
//! | `GET` | `{type}`, `{type}/{id}`, `{type}/_history`, `{type}/{id}/_history`, `{type}/{id}/_history/{vid}`, `_history`, `$export`, `$export/{job}` |
//! | `POST` | `{type}`, or nothing at all (batch/transaction bundle) |
//! | `PUT`, `PATCH` | `{type}/{id}` |
//! | `DELETE` | `{type}/{id}`, `$export/{job}` |
//! | `OPTIONS` | `{type}` followed by any number of segments |
//!
//! `{type}` is a resource type matching `^[A-Z][a-zA-Z]+$` or the literal
//! `metadata`.

use http::Method;

use super::id::is_valid_tenant_id;

/// The literal capability-statement segment.
pub const METADATA_SEGMENT: &str = "metadata";

/// The history segment.
pub const HISTORY_SEGMENT: &str = "_history";

/// The bulk-export operation segment.
pub const EXPORT_SEGMENT: &str = "$export";

/// A request path that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantPath {
    /// The tenant segment exactly as it appeared in the URL.
    pub tenant: String,
    /// The path with the prefix and tenant segments removed, always starting
    /// with `/`.
    pub canonical_path: String,
}

impl TenantPath {
    /// Returns `true` for the capability-statement route.
    pub fn is_metadata(&self) -> bool {
        self.canonical_path == "/metadata"
    }
}

/// Errors produced by the path grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The URL does not match any permitted shape for the method.
    #[error("Malformed base url: {path} for HTTP method: {method}. Expecting {expected}")]
    InvalidRoute {
        /// The raw request path.
        path: String,
        /// The HTTP method.
        method: String,
        /// Description of the expected grammar.
        expected: String,
    },
}

/// Returns the grammar description used in diagnostics.
pub fn expected_grammar(prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("/{}/{{tenantId}}/resourceType/...", prefix),
        None => "/{tenantId}/resourceType/...".to_string(),
    }
}

/// Returns `true` if `segment` looks like a FHIR resource type name.
pub fn is_resource_type(segment: &str) -> bool {
    let mut bytes = segment.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_uppercase())
        && segment.len() >= 2
        && bytes.all(|b| b.is_ascii_alphabetic())
}

/// Validates `raw_path` for `method` and strips the tenant segments.
///
/// `prefix` is the configured tenant URL part. When it is set the first segment
/// must equal it and the tenant follows; otherwise the tenant is the first
/// segment. Leading, trailing and repeated `/` separators are ignored.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use helios_tenant_router::tenant::validate_tenant_path;
///
/// let path = validate_tenant_path(&Method::GET, "/tenant/t1/Patient/12345", Some("tenant")).unwrap();
/// assert_eq!(path.tenant, "t1");
/// assert_eq!(path.canonical_path, "/Patient/12345");
///
/// assert!(validate_tenant_path(&Method::GET, "/Patient/12345", Some("tenant")).is_err());
/// ```
pub fn validate_tenant_path(
    method: &Method,
    raw_path: &str,
    prefix: Option<&str>,
) -> Result<TenantPath, RouteError> {
    let invalid = || RouteError::InvalidRoute {
        path: raw_path.to_string(),
        method: method.to_string(),
        expected: expected_grammar(prefix),
    };

    let segments: Vec<&str> = raw_path.split('/').filter(|s| !s.is_empty()).collect();
    let tenant_index = match prefix {
        Some(prefix) => {
            if segments.first() != Some(&prefix) {
                return Err(invalid());
            }
            1
        }
        None => 0,
    };

    let tenant = match segments.get(tenant_index) {
        Some(tenant) if is_valid_tenant_id(tenant) => *tenant,
        _ => return Err(invalid()),
    };

    let canonical = &segments[tenant_index + 1..];
    let accepted = if canonical.is_empty() {
        // Only a batch or transaction bundle may address the tenant base.
        *method == Method::POST
    } else {
        accepts(method, canonical)
    };

    if !accepted {
        return Err(invalid());
    }

    Ok(TenantPath {
        tenant: tenant.to_string(),
        canonical_path: format!("/{}", canonical.join("/")),
    })
}

/// Applies the per-method shape rules to the segments starting at the
/// resource-type position. `segments` is never empty.
fn accepts(method: &Method, segments: &[&str]) -> bool {
    let head = segments[0];
    let extra = segments.len() - 1;
    let is_type = is_resource_type(head) || head == METADATA_SEGMENT;

    match *method {
        Method::PUT | Method::PATCH => is_type && extra == 1,
        Method::DELETE => {
            if head == EXPORT_SEGMENT {
                extra == 1
            } else {
                is_type && extra == 1
            }
        }
        Method::GET => accepts_get(head, is_type, segments),
        Method::POST => is_type && extra == 0,
        Method::OPTIONS => is_type,
        _ => false,
    }
}

fn accepts_get(head: &str, is_type: bool, segments: &[&str]) -> bool {
    let extra = segments.len() - 1;

    if head == EXPORT_SEGMENT {
        return extra <= 1;
    }

    if segments.last() == Some(&HISTORY_SEGMENT) {
        // System history, then type history, then instance history.
        if head == HISTORY_SEGMENT && extra == 0 {
            return true;
        }
        if is_type && extra == 1 {
            return true;
        }
        if is_type && extra == 2 {
            return true;
        }
    }

    if !is_type {
        return false;
    }

    // Version read: {type}/{id}/_history/{vid}
    if extra == 3 && segments[2] == HISTORY_SEGMENT {
        return true;
    }

    extra <= 1
}
