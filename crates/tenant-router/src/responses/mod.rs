//! Response formatting.
//!
//! - [`operation_outcome`] - OperationOutcome generation
//! - [`bundle`] - Bundle response building with tenant-qualified links
//! - [`headers`] - Response header generation (ETag, Location, etc.)

pub mod bundle;
pub mod headers;
pub mod operation_outcome;

pub use bundle::{BundleBuilder, BundleEntry, BundleLink, BundleType, paging_links};
pub use headers::{FHIR_JSON, ResourceHeaders};
pub use operation_outcome::{IssueSeverity, IssueType, OperationOutcomeBuilder, success_outcome};
