//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type. A tenant identifier is either the
//! distinguished [`DEFAULT_TENANT`] or a short token of ASCII letters, digits,
//! `-` and `_` (1 to 64 characters).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The tenant that is reachable without any tenant-specific claims.
pub const DEFAULT_TENANT: &str = "DEFAULT";

/// Maximum length of a tenant identifier.
pub const MAX_TENANT_ID_LEN: usize = 64;

/// Returns `true` if `value` is a syntactically valid tenant identifier.
///
/// Valid identifiers match `^[A-Za-z0-9_-]{1,64}$`. [`DEFAULT_TENANT`] is valid
/// under this pattern as well.
///
/// # Examples
///
/// ```
/// use helios_tenant_router::tenant::is_valid_tenant_id;
///
/// assert!(is_valid_tenant_id("915b76f7-8744-4010-bd31-a1e4c0d9fc64"));
/// assert!(is_valid_tenant_id("acme_prod"));
/// assert!(!is_valid_tenant_id(""));
/// assert!(!is_valid_tenant_id("acme.prod"));
/// ```
pub fn is_valid_tenant_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_TENANT_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A validated tenant identifier.
///
/// Instances can only be obtained through [`TenantId::parse`] (or `FromStr`),
/// so every `TenantId` in the pipeline satisfies [`is_valid_tenant_id`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parses and validates a tenant identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidTenantId> {
        let value = value.into();
        if is_valid_tenant_id(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidTenantId(value))
        }
    }

    /// Returns the default tenant.
    pub fn default_tenant() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the [`DEFAULT_TENANT`].
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({:?})", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = InvalidTenantId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = InvalidTenantId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A string that does not satisfy the tenant identifier pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tenant id: {0:?}")]
pub struct InvalidTenantId(pub String);
