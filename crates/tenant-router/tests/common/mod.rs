//! Common test utilities for tenant routing tests.
//!
//! - [`harness`] - In-memory resource handler and test server builders
//! - [`fixtures`] - Identities and resources

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
