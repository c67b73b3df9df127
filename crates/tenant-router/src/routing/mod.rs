//! Route configuration.
//!
//! Maps the canonical FHIR paths to handlers and, when multi-tenancy is
//! enabled, puts the tenancy middleware in front of them.

pub mod fhir_routes;

pub use fhir_routes::{canonical_routes, create_routes};
