//! Downstream resource handler contract.
//!
//! This module defines the [`ResourceHandler`] trait, the boundary between the
//! routing envelope and whatever persists and searches resources. Every
//! operation receives a [`RequestContext`] carrying the resolved tenant, so a
//! handler never has to look at URLs or claims to know which partition to use.
//!
//! Search and history return a [`SearchPage`] of bare resources. The router
//! assembles the Bundle and builds every link under the request's tenant base.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use helios_tenant_router::backend::{HandlerResult, RequestContext, ResourceHandler};
//!
//! struct Store { /* ... */ }
//!
//! #[async_trait]
//! impl ResourceHandler for Store {
//!     fn name(&self) -> &'static str { "store" }
//!
//!     async fn read(&self, ctx: &RequestContext, resource_type: &str, id: &str)
//!         -> HandlerResult<serde_json::Value>
//!     {
//!         let tenant = ctx.tenant_id().map(|t| t.as_str()).unwrap_or("DEFAULT");
//!         // look up (tenant, resource_type, id) ...
//!     }
//!     // ...
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::tenant::{IdentityClaims, TenantId};

/// Per-request information passed to every handler operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    tenant_id: Option<TenantId>,
    identity: IdentityClaims,
}

impl RequestContext {
    /// Creates a context with a fresh request ID.
    pub fn new(tenant_id: Option<TenantId>, identity: IdentityClaims) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            tenant_id,
            identity,
        }
    }

    /// Returns the request correlation ID.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the resolved tenant, or `None` when multi-tenancy is disabled.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// Returns the caller's identity.
    pub fn identity(&self) -> &IdentityClaims {
        &self.identity
    }
}

/// Search or history parameters forwarded to the handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query parameters other than `_count` and `_offset`, in request order.
    pub params: Vec<(String, String)>,
    /// Requested page size.
    pub count: usize,
    /// Number of matches to skip.
    pub offset: usize,
}

/// One page of search or history results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// The matching resources for this page.
    pub resources: Vec<Value>,
    /// Total number of matches, if known.
    pub total: Option<usize>,
    /// Whether more matches follow this page.
    pub has_more: bool,
}

impl SearchPage {
    /// Creates a page that holds every match.
    pub fn complete(resources: Vec<Value>) -> Self {
        let total = resources.len();
        Self {
            resources,
            total: Some(total),
            has_more: false,
        }
    }
}

/// A parsed PATCH body.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchDocument {
    /// JSON Patch (RFC 6902), `application/json-patch+json`.
    JsonPatch(json_patch::Patch),
    /// JSON Merge Patch (RFC 7386), `application/merge-patch+json`.
    MergePatch(Value),
    /// FHIRPath Patch, a `Parameters` resource in `application/fhir+json`.
    FhirPathPatch(Value),
}

impl PatchDocument {
    /// Applies a JSON or merge patch to `resource`.
    ///
    /// FHIRPath patches need a FHIRPath engine and are left to the handler.
    pub fn apply_json(&self, resource: &mut Value) -> HandlerResult<()> {
        match self {
            PatchDocument::JsonPatch(patch) => json_patch::patch(resource, patch).map_err(|e| {
                HandlerError::InvalidResource {
                    message: format!("Failed to apply JSON Patch: {}", e),
                }
            }),
            PatchDocument::MergePatch(doc) => {
                json_patch::merge(resource, doc);
                Ok(())
            }
            PatchDocument::FhirPathPatch(_) => Err(HandlerError::NotSupported {
                operation: "FHIRPath Patch".to_string(),
            }),
        }
    }
}

/// Errors returned by resource handlers.
///
/// The router forwards these with a status mapping and does not interpret them.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The resource does not exist in the tenant.
    #[error("Resource {resource_type}/{id} not found")]
    NotFound {
        /// The resource type.
        resource_type: String,
        /// The resource ID.
        id: String,
    },

    /// The version does not exist.
    #[error("Version {version_id} of {resource_type}/{id} not found")]
    VersionNotFound {
        /// The resource type.
        resource_type: String,
        /// The resource ID.
        id: String,
        /// The version ID.
        version_id: String,
    },

    /// The resource content was rejected.
    #[error("Invalid resource: {message}")]
    InvalidResource {
        /// Why the resource was rejected.
        message: String,
    },

    /// A search parameter was rejected.
    #[error("Invalid search parameter '{parameter}': {message}")]
    InvalidSearchParameter {
        /// The parameter name.
        parameter: String,
        /// Why it was rejected.
        message: String,
    },

    /// The handler refused the caller.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Diagnostic message.
        message: String,
    },

    /// The handler is at its concurrency limit.
    #[error("Too many concurrent requests")]
    TooManyConcurrentRequests,

    /// The handler does not implement the operation.
    #[error("Operation not supported: {operation}")]
    NotSupported {
        /// The operation name.
        operation: String,
    },

    /// Any other failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// The resource operations the router dispatches to.
///
/// Operations without a default must be provided; history across the whole
/// tenant and bundle processing are optional.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Returns a human-readable name for this handler.
    fn name(&self) -> &'static str;

    /// Returns the resource types this handler serves, for the capability
    /// statement. An empty list advertises no specific types.
    fn resource_types(&self) -> Vec<String> {
        Vec::new()
    }

    /// Creates a resource and returns it with its assigned `id` and
    /// `meta.versionId`.
    async fn create(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        resource: Value,
    ) -> HandlerResult<Value>;

    /// Reads the current version of a resource.
    async fn read(&self, ctx: &RequestContext, resource_type: &str, id: &str)
    -> HandlerResult<Value>;

    /// Reads a specific version of a resource.
    async fn vread(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        version_id: &str,
    ) -> HandlerResult<Value>;

    /// Replaces a resource. Returns the stored resource and whether it was
    /// newly created.
    async fn update(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        resource: Value,
    ) -> HandlerResult<(Value, bool)>;

    /// Applies a patch to a resource.
    async fn patch(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        patch: PatchDocument,
    ) -> HandlerResult<Value>;

    /// Deletes a resource.
    async fn delete(&self, ctx: &RequestContext, resource_type: &str, id: &str)
    -> HandlerResult<()>;

    /// Searches resources of one type.
    async fn type_search(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage>;

    /// Returns the history of all resources of one type.
    async fn type_history(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage>;

    /// Returns the history of one resource.
    async fn instance_history(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage>;

    /// Returns the history of every resource in the tenant.
    async fn system_history(
        &self,
        _ctx: &RequestContext,
        _request: &SearchRequest,
    ) -> HandlerResult<SearchPage> {
        Err(HandlerError::NotSupported {
            operation: "system history".to_string(),
        })
    }

    /// Processes a batch or transaction Bundle and returns the response Bundle.
    async fn process_bundle(&self, _ctx: &RequestContext, _bundle: Value) -> HandlerResult<Value> {
        Err(HandlerError::NotSupported {
            operation: "batch/transaction".to_string(),
        })
    }
}
