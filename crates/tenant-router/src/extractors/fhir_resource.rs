//! FHIR resource and patch body extractors.
//!
//! Bodies must be JSON. The media type is parsed with the `mime` crate so
//! parameters such as `charset` are ignored.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use mime::Mime;
use serde_json::Value;

use crate::backend::PatchDocument;
use crate::error::RestError;

const FHIR_JSON: &str = "application/fhir+json";
const JSON_PATCH: &str = "application/json-patch+json";
const MERGE_PATCH: &str = "application/merge-patch+json";

/// Axum extractor for FHIR resources.
///
/// Accepts `application/json` and `application/fhir+json` (a missing
/// Content-Type is read as JSON) and requires a `resourceType`.
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenant_router::extractors::FhirResource;
///
/// async fn create_handler(FhirResource(resource): FhirResource) {
///     println!("Resource type: {}", resource["resourceType"]);
/// }
/// ```
#[derive(Debug)]
pub struct FhirResource(pub Value);

impl FhirResource {
    /// Returns the resource type.
    pub fn resource_type(&self) -> Option<&str> {
        self.0.get("resourceType").and_then(Value::as_str)
    }

    /// Returns the resource ID if present.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Consumes the extractor and returns the inner Value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<S> FromRequest<S> for FhirResource
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let media_type = media_type(req.headers())?;
        match media_type.as_ref().map(Mime::essence_str) {
            None | Some("application/json") | Some(FHIR_JSON) => {}
            Some(other) => {
                return Err(RestError::UnsupportedMediaType {
                    content_type: other.to_string(),
                });
            }
        }

        let value = read_json(req, state).await?;
        if value.get("resourceType").and_then(Value::as_str).is_none() {
            return Err(RestError::BadRequest {
                message: "Resource must contain resourceType".to_string(),
            });
        }

        Ok(FhirResource(value))
    }
}

/// Axum extractor for PATCH bodies.
///
/// The format follows the Content-Type: `application/json-patch+json` is a
/// JSON Patch, `application/merge-patch+json` a merge patch and
/// `application/fhir+json` a FHIRPath Patch `Parameters` resource.
#[derive(Debug)]
pub struct PatchBody(pub PatchDocument);

impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let essence = media_type(req.headers())?
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        let value = read_json(req, state).await?;
        parse_patch(&essence, value).map(PatchBody)
    }
}

fn parse_patch(essence: &str, value: Value) -> Result<PatchDocument, RestError> {
    match essence {
        JSON_PATCH => serde_json::from_value(value)
            .map(PatchDocument::JsonPatch)
            .map_err(|e| RestError::BadRequest {
                message: format!("Invalid JSON Patch: {}", e),
            }),
        MERGE_PATCH => Ok(PatchDocument::MergePatch(value)),
        FHIR_JSON => {
            if value.get("resourceType").and_then(Value::as_str) == Some("Parameters") {
                Ok(PatchDocument::FhirPathPatch(value))
            } else {
                Err(RestError::BadRequest {
                    message: "FHIRPath patch must be a Parameters resource".to_string(),
                })
            }
        }
        other => Err(RestError::UnsupportedMediaType {
            content_type: other.to_string(),
        }),
    }
}

fn media_type(headers: &HeaderMap) -> Result<Option<Mime>, RestError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(None);
    };
    let raw = value.to_str().unwrap_or_default();
    raw.parse::<Mime>()
        .map(Some)
        .map_err(|_| RestError::UnsupportedMediaType {
            content_type: raw.to_string(),
        })
}

async fn read_json<S: Send + Sync>(req: Request, state: &S) -> Result<Value, RestError> {
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| RestError::BadRequest {
            message: format!("Failed to read body: {}", e),
        })?;
    serde_json::from_slice(&bytes).map_err(|e| RestError::BadRequest {
        message: format!("Invalid JSON: {}", e),
    })
}
