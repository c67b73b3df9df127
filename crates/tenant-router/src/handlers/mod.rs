//! HTTP request handlers.
//!
//! Every handler runs on the canonical path, after the tenancy middleware has
//! validated the route and authorized the tenant. Handlers forward to the
//! [`ResourceHandler`](crate::backend::ResourceHandler) and build tenant-qualified
//! links from the [`TenantExtractor`](crate::extractors::TenantExtractor).
//!
//! - [`read`] - Read a resource by ID
//! - [`vread`] - Read a specific version of a resource
//! - [`create`] - Create a new resource
//! - [`update`] - Update an existing resource
//! - [`patch`] - Patch a resource
//! - [`delete`] - Delete a resource
//! - [`search`] - Search for resources
//! - [`history`] - Get resource history
//! - [`batch`] - Process a batch/transaction bundle
//! - [`capabilities`] - Get server capabilities (CapabilityStatement)
//! - [`health`] - Health check endpoint

pub mod batch;
pub mod capabilities;
pub mod create;
pub mod delete;
pub mod health;
pub mod history;
pub mod patch;
pub mod read;
pub mod search;
pub mod update;
pub mod vread;

pub use batch::batch_handler;
pub use capabilities::capabilities_handler;
pub use create::create_handler;
pub use delete::delete_handler;
pub use health::health_handler;
pub use history::{history_instance_handler, history_system_handler, history_type_handler};
pub use patch::patch_handler;
pub use read::read_handler;
pub use search::search_handler;
pub use update::update_handler;
pub use vread::vread_handler;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::{RestError, RestResult};
use crate::responses::ResourceHeaders;

/// Returns `resource` with its ETag and Last-Modified headers.
pub(crate) fn resource_response(
    status: StatusCode,
    headers: ResourceHeaders,
    resource: Value,
) -> Response {
    (status, headers.to_header_map(), Json(resource)).into_response()
}

/// Rejects a body whose `resourceType` differs from the URL.
pub(crate) fn check_body_type(resource: &Value, resource_type: &str) -> RestResult<()> {
    match resource.get("resourceType").and_then(Value::as_str) {
        Some(body_type) if body_type == resource_type => Ok(()),
        Some(body_type) => Err(RestError::BadRequest {
            message: format!(
                "Resource type in body ({}) does not match URL ({})",
                body_type, resource_type
            ),
        }),
        None => Err(RestError::BadRequest {
            message: "Resource must contain resourceType".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_body_type() {
        assert!(check_body_type(&json!({"resourceType": "Patient"}), "Patient").is_ok());

        let err = check_body_type(&json!({"resourceType": "Observation"}), "Patient").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Resource type in body (Observation) does not match URL (Patient)"
        );
        assert!(check_body_type(&json!({}), "Patient").is_err());
    }
}
