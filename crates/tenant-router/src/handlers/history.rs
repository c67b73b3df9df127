//! History interaction handlers.
//!
//! Implements the FHIR [history interaction](https://hl7.org/fhir/http.html#history):
//! - Instance history: `GET [base]/[type]/[id]/_history`
//! - Type history: `GET [base]/[type]/_history`
//! - System history: `GET [base]/_history`

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend::{ResourceHandler, SearchPage, SearchRequest};
use crate::error::RestResult;
use crate::extractors::{Identity, Pagination, TenantExtractor};
use crate::responses::BundleBuilder;
use crate::state::AppState;

/// Handler for instance history.
pub async fn history_instance_handler<H>(
    State(state): State<AppState<H>>,
    Path((resource_type, id)): Path<(String, String)>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    pagination: Pagination,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(
        resource_type = %resource_type,
        id = %id,
        tenant = %tenant,
        "Processing instance history request"
    );

    let request = pagination.into_search_request();
    let ctx = tenant.request_context(identity);
    let page = state
        .handler()
        .instance_history(&ctx, &resource_type, &id, &request)
        .await?;

    Ok(history_response(
        page,
        &request,
        &format!("/{}/{}/_history", resource_type, id),
        &tenant,
    ))
}

/// Handler for type history.
pub async fn history_type_handler<H>(
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
        "Processing type history request"
    );

    let request = pagination.into_search_request();
    let ctx = tenant.request_context(identity);
    let page = state
        .handler()
        .type_history(&ctx, &resource_type, &request)
        .await?;

    Ok(history_response(
        page,
        &request,
        &format!("/{}/_history", resource_type),
        &tenant,
    ))
}

/// Handler for system history.
///
/// Covers every resource in the tenant. Returns 501 when the handler does not
/// implement it.
pub async fn history_system_handler<H>(
    State(state): State<AppState<H>>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    pagination: Pagination,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    debug!(tenant = %tenant, "Processing system history request");

    let request = pagination.into_search_request();
    let ctx = tenant.request_context(identity);
    let page = state.handler().system_history(&ctx, &request).await?;

    Ok(history_response(page, &request, "/_history", &tenant))
}

fn history_response(
    page: SearchPage,
    request: &SearchRequest,
    canonical_path: &str,
    tenant: &TenantExtractor,
) -> Response {
    let bundle = BundleBuilder::history()
        .page(page, request, canonical_path, tenant.urls())
        .build();
    Json(bundle).into_response()
}
