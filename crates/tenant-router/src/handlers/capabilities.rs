//! Capabilities (CapabilityStatement) handler.
//!
//! Implements the FHIR [capabilities interaction](https://hl7.org/fhir/http.html#capabilities):
//! `GET [base]/metadata`
//!
//! The capability statement is not tenant gated. Its `implementation.url` is
//! the base the client called, so `/tenant/t1/metadata` advertises
//! `{server}/tenant/t1`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::RestResult;
use crate::extractors::TenantExtractor;
use crate::state::AppState;

/// FHIR version advertised in the capability statement.
pub const FHIR_VERSION: &str = "4.0.1";

const TYPE_INTERACTIONS: &[&str] = &[
    "read",
    "vread",
    "update",
    "patch",
    "delete",
    "history-instance",
    "history-type",
    "create",
    "search-type",
];

/// Handler for the capabilities interaction.
pub async fn capabilities_handler<H>(
    State(state): State<AppState<H>>,
    tenant: TenantExtractor,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    let base_url = tenant.urls().base_url();

    debug!(
        base_url = %base_url,
        url_tenant = tenant.urls().tenant_id().unwrap_or("-"),
        "Processing capabilities request"
    );

    let statement = build_capability_statement(&state.handler().resource_types(), &base_url);

    Ok((StatusCode::OK, Json(statement)).into_response())
}

/// Builds a CapabilityStatement for the given resource types and base URL.
pub fn build_capability_statement(resource_types: &[String], base_url: &str) -> Value {
    let resources: Vec<Value> = resource_types
        .iter()
        .map(|rt| {
            json!({
                "type": rt,
                "interaction": TYPE_INTERACTIONS
                    .iter()
                    .map(|code| json!({ "code": code }))
                    .collect::<Vec<_>>(),
                "versioning": "versioned",
                "readHistory": true,
                "updateCreate": true
            })
        })
        .collect();

    json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "date": chrono::Utc::now().format("%Y-%m-%d").to_string(),
        "kind": "instance",
        "software": {
            "name": "Helios Tenant Router",
            "version": env!("CARGO_PKG_VERSION")
        },
        "implementation": {
            "description": "Multi-tenant FHIR RESTful API",
            "url": base_url
        },
        "fhirVersion": FHIR_VERSION,
        "format": ["json"],
        "patchFormat": [
            "application/json-patch+json",
            "application/merge-patch+json",
            "application/fhir+json"
        ],
        "rest": [{
            "mode": "server",
            "resource": resources,
            "interaction": [
                { "code": "transaction" },
                { "code": "batch" },
                { "code": "history-system" }
            ]
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_statement() {
        let statement = build_capability_statement(
            &["Patient".to_string(), "Observation".to_string()],
            "https://fhir.example.com/tenant/t1",
        );

        assert_eq!(statement["resourceType"], "CapabilityStatement");
        assert_eq!(
            statement["implementation"]["url"],
            "https://fhir.example.com/tenant/t1"
        );
        assert_eq!(statement["rest"][0]["resource"][1]["type"], "Observation");
        assert_eq!(
            statement["rest"][0]["resource"][0]["interaction"]
                .as_array()
                .unwrap()
                .len(),
            TYPE_INTERACTIONS.len()
        );
    }
}
