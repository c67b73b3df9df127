//! Typed access to the caller's identity claims.
//!
//! An upstream authentication layer decodes the access token and stores the
//! resulting claim map in the request extensions as [`IdentityClaims`]. This
//! module never verifies tokens; it only reads the already-trusted claims.
//!
//! Custom claims are addressed by a configurable path. A path is first looked
//! up as a literal key (claim names such as `cognito:groups` or
//! `https://example.org/tenants` are common), then as a dotted path with
//! optional array indices, e.g. `realm_access.groups` or `tenants[0]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded claims of the authenticated caller.
///
/// An empty claim map represents an anonymous caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityClaims(Map<String, Value>);

/// The value found at a claim path.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue<'a> {
    /// A single string value.
    Text(&'a str),
    /// A list; non-string members are dropped.
    List(Vec<&'a str>),
    /// Any other JSON value (number, boolean, object).
    Other(&'a Value),
}

/// A configured claim path that is absent from the identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("claim '{path}' is not present in the identity")]
pub struct MissingClaim {
    /// The configured claim path.
    pub path: String,
}

impl IdentityClaims {
    /// Creates claims from a JSON object map.
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Creates claims from a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns `true` if no claims are present.
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the `sub` claim.
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// Returns the granted scopes.
    ///
    /// Accepts both a JSON list and the OAuth space-delimited string form.
    pub fn scopes(&self) -> Vec<&str> {
        match self.0.get("scope") {
            Some(Value::String(s)) => s.split_whitespace().collect(),
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` if the caller holds `scope` exactly.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().contains(&scope)
    }

    /// Returns the `aud` claim as a list of strings.
    ///
    /// A single string audience yields a one-element list.
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Looks up the claim at `path`.
    ///
    /// A JSON `null` is treated the same as an absent claim.
    pub fn claim(&self, path: &str) -> Result<ClaimValue<'_>, MissingClaim> {
        let found = self
            .0
            .get(path)
            .or_else(|| lookup_path(&self.0, path))
            .filter(|v| !v.is_null());

        match found {
            Some(Value::String(s)) => Ok(ClaimValue::Text(s)),
            Some(Value::Array(items)) => Ok(ClaimValue::List(
                items.iter().filter_map(Value::as_str).collect(),
            )),
            Some(other) => Ok(ClaimValue::Other(other)),
            None => Err(MissingClaim {
                path: path.to_string(),
            }),
        }
    }
}

impl From<Map<String, Value>> for IdentityClaims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// Walks a dotted path such as `a.b[1].c`.
fn lookup_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let (key, indices) = split_indices(first)?;
    let mut current = index_into(root.get(key)?, &indices)?;

    for segment in segments {
        let (key, indices) = split_indices(segment)?;
        current = index_into(current.as_object()?.get(key)?, &indices)?;
    }
    Some(current)
}

/// Splits `groups[0][2]` into `("groups", [0, 2])`.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return (!segment.is_empty()).then_some((segment, Vec::new()));
    };

    let key = &segment[..open];
    let mut indices = Vec::new();
    let mut rest = &segment[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let close = stripped.find(']')?;
        indices.push(stripped[..close].parse().ok()?);
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() || key.is_empty() {
        return None;
    }
    Some((key, indices))
}

fn index_into<'a>(mut value: &'a Value, indices: &[usize]) -> Option<&'a Value> {
    for &i in indices {
        value = value.as_array()?.get(i)?;
    }
    Some(value)
}
