//! Batch and transaction processing handler.
//!
//! Implements the FHIR [batch/transaction interaction](https://hl7.org/fhir/http.html#transaction):
//! `POST [base]` with a Bundle of type "batch" or "transaction".
//!
//! Entry processing is left to the resource handler, which receives the
//! resolved tenant like every other operation.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;

use crate::backend::ResourceHandler;
use crate::error::{RestError, RestResult};
use crate::extractors::{FhirResource, Identity, TenantExtractor};
use crate::state::AppState;

/// Handler for batch/transaction processing.
///
/// # Response
///
/// - `200 OK` - The handler's `batch-response` or `transaction-response` Bundle
/// - `400 Bad Request` - Body is not a batch or transaction Bundle
/// - `501 Not Implemented` - The handler does not process bundles
pub async fn batch_handler<H>(
    State(state): State<AppState<H>>,
    tenant: TenantExtractor,
    Identity(identity): Identity,
    FhirResource(bundle): FhirResource,
) -> RestResult<Response>
where
    H: ResourceHandler + 'static,
{
    let bundle_type = validate_bundle(&bundle)?;
    let entries = bundle
        .get("entry")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    debug!(
        bundle_type = bundle_type,
        tenant = %tenant,
        entries,
        "Processing bundle request"
    );

    let ctx = tenant.request_context(identity);
    let response = state.handler().process_bundle(&ctx, bundle).await?;

    Ok(Json(response).into_response())
}

fn validate_bundle(bundle: &Value) -> RestResult<&str> {
    let resource_type = bundle
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if resource_type != "Bundle" {
        return Err(RestError::BadRequest {
            message: format!("Expected Bundle, got {}", resource_type),
        });
    }

    match bundle.get("type").and_then(Value::as_str) {
        Some(t @ ("batch" | "transaction")) => Ok(t),
        Some(other) => Err(RestError::BadRequest {
            message: format!(
                "Bundle type must be 'batch' or 'transaction', got '{}'",
                other
            ),
        }),
        None => Err(RestError::BadRequest {
            message: "Bundle must have a type".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_bundle() {
        let batch = json!({"resourceType": "Bundle", "type": "batch"});
        assert_eq!(validate_bundle(&batch).unwrap(), "batch");

        let tx = json!({"resourceType": "Bundle", "type": "transaction"});
        assert_eq!(validate_bundle(&tx).unwrap(), "transaction");

        let collection = json!({"resourceType": "Bundle", "type": "collection"});
        assert!(validate_bundle(&collection).is_err());

        let patient = json!({"resourceType": "Patient"});
        assert_eq!(
            validate_bundle(&patient).unwrap_err().to_string(),
            "Expected Bundle, got Patient"
        );
    }
}
