//! Create interaction handler.
//!
//! Implements the FHIR [create interaction](https://hl7.org/fhir/http.html#create):
//! `POST [base]/[type]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::{FhirResource, Identity, TenantExtractor};
use crate::responses::ResourceHeaders;
use crate::state::AppState;

use super::{check_body_type, resource_response};

/// Handler for the create interaction.
///
/// The handler assigns the ID. The `Location` header addresses the new
/// version under the same tenant base the client used.
///
/// # Response
///
/// - `201 Created` - Resource created
/// - `400 Bad Request` - Body type does not match the URL
/// - `415 Unsupported Media Type` - Body is not JSON
///
/// # Example
///
/// ```http
/// POST /tenant/t1/Patient HTTP/1.1
/// Content-Type: application/fhir+json
///
/// {"resourceType": "Patient", "name": [{"family": "Smith"}]}
/// ```
pub async fn create_handler<H>(
    State(state): State<AppState<H>>,
    Path(resource_type): Path<String>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    FhirResource(resource): FhirResource,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        tenant = %tenant,
        "Processing create request"
    );

    check_body_type(&resource, &resource_type)?;

    let ctx = tenant.request_context(identity);
    let created = state
        .handler()
        .create(&ctx, &resource_type, resource)
        .await?;

    let headers =
        ResourceHeaders::from_resource(&created).with_resource_location(&created, tenant.urls());

    debug!(
        resource_type = %resource_type,
        location = headers.location().unwrap_or("-"),
        "Resource created"
    );

    Ok(resource_response(StatusCode::CREATED, headers, created))
}
