//! Resource response headers.
//!
//! `ETag` and `Last-Modified` come from the resource's `meta`. `Location`
//! points at the new version under the caller's tenant base.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::DateTime;
use serde_json::Value;

use crate::tenant::TenantUrlContext;

/// The FHIR JSON media type.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Builder for resource response headers.
///
/// Generates ETag, Last-Modified, Location and Content-Type.
#[derive(Debug)]
pub struct ResourceHeaders {
    etag: Option<String>,
    last_modified: Option<String>,
    location: Option<String>,
    content_type: String,
}

impl Default for ResourceHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHeaders {
    /// Creates a new ResourceHeaders builder.
    pub fn new() -> Self {
        Self {
            etag: None,
            last_modified: None,
            location: None,
            content_type: FHIR_JSON.to_string(),
        }
    }

    /// Creates headers from a resource's `meta.versionId` and
    /// `meta.lastUpdated`.
    pub fn from_resource(resource: &Value) -> Self {
        let meta = resource.get("meta");
        let version_id = meta
            .and_then(|m| m.get("versionId"))
            .and_then(Value::as_str);
        let last_modified = meta
            .and_then(|m| m.get("lastUpdated"))
            .and_then(Value::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.to_utc().format("%a, %d %b %Y %H:%M:%S GMT").to_string());

        let mut headers = Self::new();
        if let Some(vid) = version_id {
            headers = headers.with_version(vid);
        }
        headers.last_modified = last_modified;
        headers
    }

    /// Sets the ETag from a version ID.
    pub fn with_version(mut self, version_id: &str) -> Self {
        self.etag = Some(format!("W/\"{}\"", version_id));
        self
    }

    /// Sets the Location URL.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets Location to the version URL of `resource` under `urls`, falling
    /// back to the resource URL when there is no version.
    pub fn with_resource_location(self, resource: &Value, urls: &TenantUrlContext) -> Self {
        let resource_type = resource.get("resourceType").and_then(Value::as_str);
        let id = resource.get("id").and_then(Value::as_str);
        let version_id = resource
            .get("meta")
            .and_then(|m| m.get("versionId"))
            .and_then(Value::as_str);

        match (resource_type, id, version_id) {
            (Some(rt), Some(id), Some(vid)) => self.with_location(urls.version_url(rt, id, vid)),
            (Some(rt), Some(id), None) => self.with_location(urls.resource_url(rt, id)),
            _ => self,
        }
    }

    /// Converts to an Axum HeaderMap.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }

        let optional = [
            (header::ETAG, &self.etag),
            (header::LAST_MODIFIED, &self.last_modified),
            (header::LOCATION, &self.location),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }

        headers
    }

    /// Returns the ETag value.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Returns the Last-Modified value.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Returns the Location value.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenancyMode;
    use serde_json::json;

    #[test]
    fn test_new() {
        let headers = ResourceHeaders::new();
        assert_eq!(headers.content_type, FHIR_JSON);
        assert!(headers.etag().is_none());
    }

    #[test]
    fn test_from_resource() {
        let headers = ResourceHeaders::from_resource(&json!({
            "resourceType": "Patient",
            "id": "1",
            "meta": {"versionId": "42", "lastUpdated": "2024-01-05T10:30:00Z"}
        }));
        assert_eq!(headers.etag(), Some("W/\"42\""));
        assert_eq!(headers.last_modified(), Some("Fri, 05 Jan 2024 10:30:00 GMT"));
    }

    #[test]
    fn test_tenant_location() {
        let urls = TenantUrlContext::new(
            "https://fhir.example.com",
            Some("t1"),
            &TenancyMode::EnabledNoPrefix,
        );
        let resource = json!({"resourceType": "Patient", "id": "1", "meta": {"versionId": "1"}});
        let headers = ResourceHeaders::new().with_resource_location(&resource, &urls);
        assert_eq!(
            headers.location(),
            Some("https://fhir.example.com/t1/Patient/1/_history/1")
        );

        let map = headers.to_header_map();
        assert!(map.contains_key(header::CONTENT_TYPE));
        assert!(map.contains_key(header::LOCATION));
        assert!(!map.contains_key(header::ETAG));
    }
}
