//! Tenant URL validation and prefix stripping.
//!
//! The first of the two tenancy stages. It checks the raw path against the
//! tenant-scoped grammar for the request method, records the result as a
//! [`ResolvedRequest`] extension and rewrites the URI to the canonical path
//! so the resource routes never see tenant segments.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Uri, uri::PathAndQuery},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::error::RestError;
use crate::tenant::{ResolvedRequest, TenancyPipeline};

/// Middleware that validates the tenant route and strips the tenant segments.
///
/// Malformed routes are answered with 400 and never reach authorization.
/// When multi-tenancy is disabled the request passes through untouched.
pub async fn strip_tenant_prefix_middleware(
    State(pipeline): State<Arc<TenancyPipeline>>,
    mut request: Request,
    next: Next,
) -> Response {
    let original_uri = request.uri().clone();
    let method = request.method().clone();
    let raw_path = original_uri.path();

    let path = match pipeline.validate_route(&method, raw_path) {
        Ok(Some(path)) => path,
        Ok(None) => return next.run(request).await,
        Err(e) => {
            warn!(method = %method, path = %raw_path, "Rejected malformed tenant route");
            return RestError::from(e).into_response();
        }
    };

    let Some(canonical_uri) = rewrite_path(&original_uri, &path.canonical_path) else {
        return RestError::BadRequest {
            message: format!("Cannot rewrite request path {}", raw_path),
        }
        .into_response();
    };

    debug!(
        method = %method,
        path = %raw_path,
        canonical_path = %path.canonical_path,
        tenant = %path.tenant,
        "Validated tenant route"
    );

    request
        .extensions_mut()
        .insert(ResolvedRequest::new(method, raw_path, path));
    *request.uri_mut() = canonical_uri;

    next.run(request).await
}

/// Builds a new URI with a different path but the same query.
fn rewrite_path(original: &Uri, new_path: &str) -> Option<Uri> {
    let path_and_query = match original.query() {
        Some(query) => format!("{}?{}", new_path, query),
        None => new_path.to_string(),
    };

    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_path_keeps_query() {
        let uri: Uri = "/tenant/t1/Patient?_count=10&name=x".parse().unwrap();
        let rewritten = rewrite_path(&uri, "/Patient").unwrap();
        assert_eq!(rewritten.path(), "/Patient");
        assert_eq!(rewritten.query(), Some("_count=10&name=x"));
    }

    #[test]
    fn test_rewrite_path_without_query() {
        let uri: Uri = "/t1/Patient/1".parse().unwrap();
        let rewritten = rewrite_path(&uri, "/Patient/1").unwrap();
        assert_eq!(rewritten.path(), "/Patient/1");
        assert_eq!(rewritten.query(), None);
    }

    #[test]
    fn test_rewrite_absolute_uri() {
        let uri: Uri = "http://localhost:8080/t1/metadata".parse().unwrap();
        let rewritten = rewrite_path(&uri, "/metadata").unwrap();
        assert_eq!(rewritten.to_string(), "http://localhost:8080/metadata");
    }
}
