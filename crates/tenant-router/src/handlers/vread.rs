//! Version read handler.
//!
//! `GET [base]/[type]/[id]/_history/[vid]`

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

/// Handler for the vread interaction.
pub async fn vread_handler<H>(
    State(state): State<AppState<H>>,
    Path((resource_type, id, version_id)): Path<(String, String, String)>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        version_id = %version_id,
        tenant = %tenant,
        "Processing vread request"
    );

    let ctx = tenant.request_context(identity);
    let resource = state
        .handler()
        .vread(&ctx, &resource_type, &id, &version_id)
        .await?;

    Ok(resource_response(
        StatusCode::OK,
        ResourceHeaders::from_resource(&resource),
        resource,
    ))
}
