//! Patch interaction handler.
//!
//! Implements the FHIR [patch interaction](https://hl7.org/fhir/http.html#patch):
//! `PATCH [base]/[type]/[id]`
//!
//! Supported formats:
//! - JSON Patch (`application/json-patch+json`)
//! - JSON Merge Patch (`application/merge-patch+json`)
//! - FHIRPath Patch (`application/fhir+json` with a Parameters resource)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::{Identity, PatchBody, TenantExtractor};
use crate::responses::ResourceHeaders;
use crate::state::AppState;

use super::resource_response;

/// Handler for the patch interaction.
pub async fn patch_handler<H>(
    State(state): State<AppState<H>>,
    Path((resource_type, id)): Path<(String, String)>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    PatchBody(patch): PatchBody,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing patch request"
    );

    let ctx = tenant.request_context(identity);
    let patched = state
        .handler()
        .patch(&ctx, &resource_type, &id, patch)
        .await?;

    Ok(resource_response(
        StatusCode::OK,
        ResourceHeaders::from_resource(&patched),
        patched,
    ))
}
