//! FHIR OperationOutcome bodies.
//!
//! Every error response, and the body of a successful delete, is an
//! [OperationOutcome](https://hl7.org/fhir/operationoutcome.html) with one or
//! more issues. Issue text is carried in `diagnostics`.

use serde::Serialize;
use serde_json::{Value, json};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// The request failed.
    Error,
    /// Processing succeeded with a concern.
    Warning,
    /// Purely informational.
    Information,
}

/// Issue codes emitted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    /// Malformed URL or content.
    Invalid,
    /// Resource or route not found.
    NotFound,
    /// Media type, interaction or operation not supported.
    NotSupported,
    /// Tenant authorization failure.
    Security,
    /// A downstream concurrency limit was hit.
    Throttled,
    /// Unexpected failure.
    Exception,
    /// Informational message.
    Informational,
}

/// One `OperationOutcome.issue` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Issue severity.
    pub severity: IssueSeverity,
    /// Issue code.
    pub code: IssueType,
    /// Text shown to the caller.
    pub diagnostics: String,
}

impl Issue {
    /// Creates an issue.
    pub fn new(severity: IssueSeverity, code: IssueType, diagnostics: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Collects issues into an OperationOutcome resource.
///
/// ```
/// use helios_tenant_router::responses::{IssueType, OperationOutcomeBuilder};
///
/// let outcome = OperationOutcomeBuilder::new()
///     .error(IssueType::Security, "Unauthorized")
///     .build();
/// assert_eq!(outcome["issue"][0]["code"], "security");
/// ```
#[derive(Debug, Default)]
pub struct OperationOutcomeBuilder {
    issues: Vec<Issue>,
}

impl OperationOutcomeBuilder {
    /// Starts an outcome with no issues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `issue`.
    pub fn add_issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Appends an `error` issue.
    pub fn error(self, code: IssueType, diagnostics: impl Into<String>) -> Self {
        self.add_issue(Issue::new(IssueSeverity::Error, code, diagnostics))
    }

    /// Appends an `information` issue.
    pub fn information(self, code: IssueType, diagnostics: impl Into<String>) -> Self {
        self.add_issue(Issue::new(IssueSeverity::Information, code, diagnostics))
    }

    /// Returns the OperationOutcome JSON.
    pub fn build(self) -> Value {
        json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues
        })
    }
}

/// An OperationOutcome reporting that an interaction succeeded.
pub fn success_outcome(message: &str) -> Value {
    OperationOutcomeBuilder::new()
        .information(IssueType::Informational, message)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_codes_serialize_as_fhir_codes() {
        let outcome = OperationOutcomeBuilder::new()
            .error(IssueType::NotFound, "Resource Patient/1 not found")
            .error(IssueType::NotSupported, "xml")
            .build();

        assert_eq!(outcome["resourceType"], "OperationOutcome");
        assert_eq!(outcome["issue"][0]["severity"], "error");
        assert_eq!(outcome["issue"][0]["code"], "not-found");
        assert_eq!(outcome["issue"][0]["diagnostics"], "Resource Patient/1 not found");
        assert_eq!(outcome["issue"][1]["code"], "not-supported");
    }

    #[test]
    fn test_warning_issue() {
        let outcome = OperationOutcomeBuilder::new()
            .add_issue(Issue::new(
                IssueSeverity::Warning,
                IssueType::Throttled,
                "slow down",
            ))
            .build();
        assert_eq!(outcome["issue"][0]["severity"], "warning");
        assert_eq!(outcome["issue"][0]["code"], "throttled");
    }

    #[test]
    fn test_success_outcome() {
        let outcome = success_outcome("Deleted Patient/1");
        assert_eq!(outcome["issue"].as_array().map(Vec::len), Some(1));
        assert_eq!(outcome["issue"][0]["severity"], "information");
        assert_eq!(outcome["issue"][0]["code"], "informational");
        assert_eq!(outcome["issue"][0]["diagnostics"], "Deleted Patient/1");
    }
}
