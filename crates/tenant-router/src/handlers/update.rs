//! Update interaction handler.
//!
//! Implements the FHIR [update interaction](https://hl7.org/fhir/http.html#update):
//! `PUT [base]/[type]/[id]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::Value;
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::{RestError, RestResult};
use crate::extractors::{FhirResource, Identity, TenantExtractor};
use crate::responses::ResourceHeaders;
use crate::state::AppState;

use super::{check_body_type, resource_response};

/// Handler for the update interaction.
///
/// # Response
///
/// - `200 OK` - Existing resource replaced
/// - `201 Created` - Update created the resource, with `Location`
/// - `400 Bad Request` - Body type or id does not match the URL
pub async fn update_handler<H>(
    State(state): State<AppState<H>>,
    Path((resource_type, id)): Path<(String, String)>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    FhirResource(resource): FhirResource,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing update request"
    );

    check_body_type(&resource, &resource_type)?;
    match resource.get("id").and_then(Value::as_str) {
        Some(body_id) if body_id != id => {
            return Err(RestError::BadRequest {
                message: format!("Resource id in body ({}) does not match URL ({})", body_id, id),
            });
        }
        _ => {}
    }

    let ctx = tenant.request_context(identity);
    let (stored, created) = state
        .handler()
        .update(&ctx, &resource_type, &id, resource)
        .await?;

    let headers = ResourceHeaders::from_resource(&stored);
    if created {
        let headers = headers.with_resource_location(&stored, tenant.urls());
        Ok(resource_response(StatusCode::CREATED, headers, stored))
    } else {
        Ok(resource_response(StatusCode::OK, headers, stored))
    }
}
