//! Caller identity extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::tenant::IdentityClaims;

/// The caller's claims, as inserted by the authentication layer.
///
/// Requests without an [`IdentityClaims`] extension yield anonymous claims.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub IdentityClaims);

impl Identity {
    /// Consumes the extractor and returns the claims.
    pub fn into_inner(self) -> IdentityClaims {
        self.0
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(
            parts
                .extensions
                .get::<IdentityClaims>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
