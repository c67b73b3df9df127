//! Search interaction handler.
//!
//! Implements the FHIR [search interaction](https://hl7.org/fhir/http.html#search):
//! `GET [base]/[type]?params`

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::{Identity, Pagination, TenantExtractor};
use crate::responses::BundleBuilder;
use crate::state::AppState;

/// Handler for type-level search.
///
/// Returns a `searchset` Bundle whose `self`/`next`/`previous` links and entry
/// `fullUrl`s live under the tenant base.
pub async fn search_handler<H>(
    State(state): State<AppState<H>>,
    Path(resource_type): Path<String>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    pagination: Pagination,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        tenant = %tenant,
        count = pagination.count(),
        offset = pagination.offset(),
        "Processing search request"
    );

    let request = pagination.into_search_request();
    let ctx = tenant.request_context(identity);
    let page = state
        .handler()
        .type_search(&ctx, &resource_type, &request)
        .await?;

    let bundle = BundleBuilder::searchset()
        .page(page, &request, &format!("/{}", resource_type), tenant.urls())
        .build();

    Ok(Json(bundle).into_response())
}
