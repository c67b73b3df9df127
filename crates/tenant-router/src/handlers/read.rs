//! Read interaction handler.
//!
//! Implements the FHIR [read interaction](https://hl7.org/fhir/http.html#read):
//! `GET [base]/[type]/[id]`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::{Identity, TenantExtractor};
use crate::responses::ResourceHeaders;
use crate::state::AppState;

use super::resource_response;

/// Handler for the read interaction.
///
/// # Response
///
/// - `200 OK` - Resource found, returns the resource with its ETag
/// - `404 Not Found` - Resource does not exist in the tenant
pub async fn read_handler<H>(
    State(state): State<AppState<H>>,
    Path((resource_type, id)): Path<(String, String)>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing read request"
    );

    let ctx = tenant.request_context(identity);
    let resource = state.handler().read(&ctx, &resource_type, &id).await?;

    Ok(resource_response(
        StatusCode::OK,
        ResourceHeaders::from_resource(&resource),
        resource,
    ))
}
