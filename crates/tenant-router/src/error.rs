//! Error types for the tenant router.
//!
//! This module defines the error type surfaced at the HTTP boundary, with
//! automatic conversion to FHIR OperationOutcome responses.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status | FHIR Issue Code |
//! |--------|-------------|-----------------|
//! | Malformed tenant route | 400 | invalid |
//! | Tenant unauthorized / access denied | 401 | security |
//! | Configured tenant claim missing | 401 | security |
//! | Handler NotFound / VersionNotFound | 404 | not-found |
//! | Handler InvalidResource / InvalidSearchParameter | 400 | invalid |
//! | Unsupported body media type | 415 | not-supported |
//! | Handler TooManyConcurrentRequests | 429 | throttled |
//! | Handler NotSupported | 501 | not-supported |
//! | Handler Internal | 500 | exception |

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::error;

use crate::backend::HandlerError;
use crate::responses::operation_outcome::{IssueType, OperationOutcomeBuilder};
use crate::tenant::{RouteError, TenantError};

/// Seconds a throttled client is asked to wait.
pub const RETRY_AFTER_SECS: u64 = 900;

/// The primary error type for request processing.
///
/// This enum provides semantic error types that map cleanly to HTTP status codes
/// and FHIR OperationOutcome issue codes.
#[derive(Debug)]
pub enum RestError {
    /// The URL does not match the tenant-scoped grammar (HTTP 400).
    InvalidRoute {
        /// The raw request path.
        path: String,
        /// The HTTP method.
        method: String,
        /// Description of the expected grammar.
        expected: String,
    },

    /// Tenant authorization failed (HTTP 401).
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// The configured tenant claim is absent from the identity (HTTP 401).
    MisconfiguredClaim {
        /// The configured claim path.
        claim: String,
    },

    /// Resource not found (HTTP 404).
    NotFound {
        /// The resource type (e.g., "Patient").
        resource_type: String,
        /// The resource ID.
        id: String,
    },

    /// Version not found for vread (HTTP 404).
    VersionNotFound {
        /// The resource type.
        resource_type: String,
        /// The resource ID.
        id: String,
        /// The version ID.
        version_id: String,
    },

    /// No route matches the canonical path (HTTP 404).
    RouteNotFound {
        /// The request path.
        path: String,
    },

    /// Bad request - validation error (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },

    /// A downstream concurrency limit was hit (HTTP 429).
    TooManyConcurrentRequests,

    /// Not implemented (HTTP 501).
    NotImplemented {
        /// Description of what's not implemented.
        feature: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message. Logged, never returned to the caller.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::InvalidRoute {
                path,
                method,
                expected,
            } => write!(
                f,
                "Malformed base url: {} for HTTP method: {}. Expecting {}",
                path, method, expected
            ),
            RestError::Unauthorized { message } => write!(f, "{}", message),
            RestError::MisconfiguredClaim { claim } => {
                write!(f, "Unauthorized wrong token claim {}", claim)
            }
            RestError::NotFound { resource_type, id } => {
                write!(f, "Resource {}/{} not found", resource_type, id)
            }
            RestError::VersionNotFound {
                resource_type,
                id,
                version_id,
            } => write!(
                f,
                "Version {} of {}/{} not found",
                version_id, resource_type, id
            ),
            RestError::RouteNotFound { path } => write!(f, "Not found: {}", path),
            RestError::BadRequest { message } => write!(f, "{}", message),
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Content type '{}' is not supported", content_type)
            }
            RestError::TooManyConcurrentRequests => write!(f, "Too many concurrent requests"),
            RestError::NotImplemented { feature } => {
                write!(f, "Feature '{}' is not implemented", feature)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::InvalidRoute { .. } | RestError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            RestError::Unauthorized { .. } | RestError::MisconfiguredClaim { .. } => {
                StatusCode::UNAUTHORIZED
            }
            RestError::NotFound { .. }
            | RestError::VersionNotFound { .. }
            | RestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RestError::TooManyConcurrentRequests => StatusCode::TOO_MANY_REQUESTS,
            RestError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the FHIR issue type for this error.
    pub fn issue_type(&self) -> IssueType {
        match self {
            RestError::InvalidRoute { .. } | RestError::BadRequest { .. } => IssueType::Invalid,
            RestError::Unauthorized { .. } | RestError::MisconfiguredClaim { .. } => {
                IssueType::Security
            }
            RestError::NotFound { .. }
            | RestError::VersionNotFound { .. }
            | RestError::RouteNotFound { .. } => IssueType::NotFound,
            RestError::UnsupportedMediaType { .. } | RestError::NotImplemented { .. } => {
                IssueType::NotSupported
            }
            RestError::TooManyConcurrentRequests => IssueType::Throttled,
            RestError::InternalError { .. } => IssueType::Exception,
        }
    }

    /// Returns the diagnostic text sent to the caller.
    fn public_message(&self) -> String {
        match self {
            RestError::InternalError { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let RestError::InternalError { message } = &self {
            error!(error = %message, "Request failed with an internal error");
        }

        let outcome = OperationOutcomeBuilder::new()
            .error(self.issue_type(), self.public_message())
            .build();
        let mut response = (status, Json(outcome)).into_response();

        if matches!(self, RestError::TooManyConcurrentRequests) {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(RETRY_AFTER_SECS),
            );
        }

        response
    }
}

impl From<RouteError> for RestError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::InvalidRoute {
                path,
                method,
                expected,
            } => RestError::InvalidRoute {
                path,
                method,
                expected,
            },
        }
    }
}

impl From<TenantError> for RestError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::MisconfiguredClaim { claim } => RestError::MisconfiguredClaim { claim },
            TenantError::Unauthorized
            | TenantError::AmbiguousAudience
            | TenantError::AccessDenied { .. } => RestError::Unauthorized {
                message: err.to_string(),
            },
        }
    }
}

impl From<HandlerError> for RestError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::NotFound { resource_type, id } => {
                RestError::NotFound { resource_type, id }
            }
            HandlerError::VersionNotFound {
                resource_type,
                id,
                version_id,
            } => RestError::VersionNotFound {
                resource_type,
                id,
                version_id,
            },
            HandlerError::InvalidResource { message } => RestError::BadRequest { message },
            HandlerError::InvalidSearchParameter { .. } => RestError::BadRequest {
                message: err.to_string(),
            },
            HandlerError::Unauthorized { .. } => RestError::Unauthorized {
                message: err.to_string(),
            },
            HandlerError::TooManyConcurrentRequests => RestError::TooManyConcurrentRequests,
            HandlerError::NotSupported { operation } => {
                RestError::NotImplemented { feature: operation }
            }
            HandlerError::Internal(e) => RestError::InternalError {
                message: format!("{:#}", e),
            },
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type alias for request processing.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn outcome(err: RestError) -> (StatusCode, Option<HeaderValue>, Value) {
        let response = err.into_response();
        let status = response.status();
        let retry_after = response.headers().get(header::RETRY_AFTER).cloned();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, retry_after, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_invalid_route_display() {
        let err = RestError::from(RouteError::InvalidRoute {
            path: "/Patient/12345".to_string(),
            method: "GET".to_string(),
            expected: "/tenant/{tenantId}/resourceType/...".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Malformed base url: /Patient/12345 for HTTP method: GET. \
             Expecting /tenant/{tenantId}/resourceType/..."
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_tenant_errors_are_401() {
        for err in [
            TenantError::Unauthorized,
            TenantError::AmbiguousAudience,
            TenantError::AccessDenied {
                tenant: "t1".to_string(),
            },
            TenantError::MisconfiguredClaim {
                claim: "cognito:groups".to_string(),
            },
        ] {
            assert_eq!(RestError::from(err).status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_handler_error_mapping() {
        let not_found = RestError::from(HandlerError::NotFound {
            resource_type: "Patient".to_string(),
            id: "1".to_string(),
        });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = RestError::from(HandlerError::InvalidSearchParameter {
            parameter: "birthdate".to_string(),
            message: "bad date".to_string(),
        });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert!(invalid.to_string().contains("birthdate"));

        let throttled = RestError::from(HandlerError::TooManyConcurrentRequests);
        assert_eq!(throttled.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let internal = RestError::from(HandlerError::Internal(anyhow::anyhow!("boom")));
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unauthorized_outcome() {
        let (status, _, body) = outcome(RestError::from(TenantError::MisconfiguredClaim {
            claim: "cognito:groups".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["resourceType"], "OperationOutcome");
        assert_eq!(body["issue"][0]["code"], "security");
        assert_eq!(
            body["issue"][0]["diagnostics"],
            "Unauthorized wrong token claim cognito:groups"
        );
    }

    #[tokio::test]
    async fn test_throttled_sets_retry_after() {
        let (status, retry_after, body) = outcome(RestError::TooManyConcurrentRequests).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(retry_after, Some(HeaderValue::from_static("900")));
        assert_eq!(body["issue"][0]["code"], "throttled");
    }

    #[tokio::test]
    async fn test_internal_error_is_not_echoed() {
        let (status, _, body) = outcome(RestError::InternalError {
            message: "connection string postgres://secret".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["issue"][0]["diagnostics"], "Internal server error");
    }
}
