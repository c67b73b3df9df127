//! Delete interaction handler.
//!
//! Implements the FHIR [delete interaction](https://hl7.org/fhir/http.html#delete):
//! `DELETE [base]/[type]/[id]`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::{Identity, TenantExtractor};
use crate::responses::success_outcome;
use crate::state::AppState;

/// Handler for the delete interaction.
///
/// Returns `200 OK` with an informational OperationOutcome.
pub async fn delete_handler<H>(
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
        "Processing delete request"
    );

    let ctx = tenant.request_context(identity);
    state.handler().delete(&ctx, &resource_type, &id).await?;

    let outcome = success_outcome(&format!("Deleted {}/{}", resource_type, id));
    Ok((StatusCode::OK, Json(outcome)).into_response())
}
