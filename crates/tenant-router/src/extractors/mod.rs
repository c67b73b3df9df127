//! Axum extractors.
//!
//! - [`TenantExtractor`] - The authorized tenant and its URL context
//! - [`Identity`] - The caller's claims
//! - [`FhirResource`] / [`PatchBody`] - JSON request bodies
//! - [`Pagination`] - `_count`, `_offset` and search parameters

mod fhir_resource;
mod identity;
mod pagination;
mod tenant;

pub use fhir_resource::{FhirResource, PatchBody};
pub use identity::Identity;
pub use pagination::Pagination;
pub use tenant::TenantExtractor;
