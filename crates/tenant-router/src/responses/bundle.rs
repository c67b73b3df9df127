//! Bundle response building.
//!
//! Search and history results come back from the handler as bare resources.
//! This module wraps them in a FHIR Bundle whose `fullUrl` and paging links
//! are built from the request's [`TenantUrlContext`], so a client that called
//! `/tenant/t1/Patient` gets links under `/tenant/t1/`.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use url::form_urlencoded;

use crate::backend::{SearchPage, SearchRequest};
use crate::tenant::TenantUrlContext;

/// Bundle types produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleType {
    /// Search results bundle.
    Searchset,
    /// History results bundle.
    History,
}

impl BundleType {
    /// Returns the FHIR code string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Searchset => "searchset",
            BundleType::History => "history",
        }
    }
}

/// A link in a Bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLink {
    /// The relation type (self, next, previous).
    pub relation: String,
    /// The URL.
    pub url: String,
}

impl BundleLink {
    /// Creates a new link.
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            url: url.into(),
        }
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "relation": self.relation,
            "url": self.url
        })
    }
}

/// An entry in a Bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Full URL of the resource.
    pub full_url: Option<String>,
    /// The resource itself.
    pub resource: Value,
    /// Whether to mark the entry as a search match.
    pub search_match: bool,
}

impl BundleEntry {
    /// Creates an entry whose `fullUrl` is derived from the resource's type
    /// and id under `urls`.
    pub fn for_resource(resource: Value, urls: &TenantUrlContext) -> Self {
        let full_url = match (
            resource.get("resourceType").and_then(Value::as_str),
            resource.get("id").and_then(Value::as_str),
        ) {
            (Some(resource_type), Some(id)) => Some(urls.resource_url(resource_type, id)),
            _ => None,
        };
        Self {
            full_url,
            resource,
            search_match: false,
        }
    }

    /// Marks the entry as a search match.
    pub fn matched(mut self) -> Self {
        self.search_match = true;
        self
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut entry = json!({});
        if let Some(url) = &self.full_url {
            entry["fullUrl"] = json!(url);
        }
        entry["resource"] = self.resource.clone();
        if self.search_match {
            entry["search"] = json!({ "mode": "match" });
        }
        entry
    }
}

/// Builder for Bundle resources.
#[derive(Debug)]
pub struct BundleBuilder {
    bundle_type: BundleType,
    total: Option<usize>,
    links: Vec<BundleLink>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Creates a new builder for a specific bundle type.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            bundle_type,
            total: None,
            links: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Creates a searchset bundle builder.
    pub fn searchset() -> Self {
        Self::new(BundleType::Searchset)
    }

    /// Creates a history bundle builder.
    pub fn history() -> Self {
        Self::new(BundleType::History)
    }

    /// Sets the total count.
    pub fn total(mut self, count: usize) -> Self {
        self.total = Some(count);
        self
    }

    /// Adds a link.
    pub fn add_link(mut self, link: BundleLink) -> Self {
        self.links.push(link);
        self
    }

    /// Adds an entry.
    pub fn add_entry(mut self, entry: BundleEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds the results of a handler page with `self`, `next` and `previous`
    /// links for `canonical_path` under `urls`.
    pub fn page(
        mut self,
        page: SearchPage,
        request: &SearchRequest,
        canonical_path: &str,
        urls: &TenantUrlContext,
    ) -> Self {
        let matched = self.bundle_type == BundleType::Searchset;

        for link in paging_links(urls, canonical_path, request, page.has_more) {
            self = self.add_link(link);
        }
        if let Some(total) = page.total {
            self = self.total(total);
        }
        for resource in page.resources {
            let entry = BundleEntry::for_resource(resource, urls);
            self = self.add_entry(if matched { entry.matched() } else { entry });
        }
        self
    }

    /// Builds the Bundle resource.
    pub fn build(self) -> Value {
        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": self.bundle_type.as_str(),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        });

        if let Some(total) = self.total {
            bundle["total"] = json!(total);
        }

        if !self.links.is_empty() {
            bundle["link"] = json!(self.links.iter().map(BundleLink::to_json).collect::<Vec<_>>());
        }

        bundle["entry"] = json!(self.entries.iter().map(BundleEntry::to_json).collect::<Vec<_>>());

        bundle
    }
}

/// Builds the paging links for one page of results.
///
/// `self` always points at the current page. `next` is present when the
/// handler reports more matches and `previous` when the offset is non-zero.
pub fn paging_links(
    urls: &TenantUrlContext,
    canonical_path: &str,
    request: &SearchRequest,
    has_more: bool,
) -> Vec<BundleLink> {
    let base = urls.url_for(canonical_path);
    let mut links = vec![BundleLink::new(
        "self",
        page_url(&base, request, request.offset),
    )];

    if has_more {
        links.push(BundleLink::new(
            "next",
            page_url(&base, request, request.offset + request.count),
        ));
    }
    if request.offset > 0 {
        links.push(BundleLink::new(
            "previous",
            page_url(&base, request, request.offset.saturating_sub(request.count)),
        ));
    }

    links
}

fn page_url(base: &str, request: &SearchRequest, offset: usize) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in &request.params {
        query.append_pair(name, value);
    }
    query.append_pair("_count", &request.count.to_string());
    if offset > 0 {
        query.append_pair("_offset", &offset.to_string());
    }
    format!("{}?{}", base, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenancyMode;

    fn urls() -> TenantUrlContext {
        TenantUrlContext::new(
            "https://fhir.example.com",
            Some("t1"),
            &TenancyMode::EnabledWithPrefix("tenant".to_string()),
        )
    }

    fn request(offset: usize) -> SearchRequest {
        SearchRequest {
            params: vec![("name".to_string(), "Smith".to_string())],
            count: 10,
            offset,
        }
    }

    #[test]
    fn test_searchset_bundle() {
        let page = SearchPage {
            resources: vec![json!({"resourceType": "Patient", "id": "123"})],
            total: Some(11),
            has_more: true,
        };

        let bundle = BundleBuilder::searchset()
            .page(page, &request(0), "/Patient", &urls())
            .build();

        assert_eq!(bundle["resourceType"], "Bundle");
        assert_eq!(bundle["type"], "searchset");
        assert_eq!(bundle["total"], 11);
        assert_eq!(bundle["entry"][0]["search"]["mode"], "match");
        assert_eq!(
            bundle["entry"][0]["fullUrl"],
            "https://fhir.example.com/tenant/t1/Patient/123"
        );
        assert_eq!(
            bundle["link"][0]["url"],
            "https://fhir.example.com/tenant/t1/Patient?name=Smith&_count=10"
        );
        assert_eq!(bundle["link"][1]["relation"], "next");
        assert_eq!(
            bundle["link"][1]["url"],
            "https://fhir.example.com/tenant/t1/Patient?name=Smith&_count=10&_offset=10"
        );
        assert!(bundle["timestamp"].is_string());
    }

    #[test]
    fn test_history_bundle_has_no_search_mode() {
        let page = SearchPage::complete(vec![json!({
            "resourceType": "Patient",
            "id": "1",
            "meta": {"versionId": "2"}
        })]);

        let bundle = BundleBuilder::history()
            .page(page, &request(0), "/Patient/1/_history", &urls())
            .build();

        assert_eq!(bundle["type"], "history");
        assert!(bundle["entry"][0].get("search").is_none());
        assert_eq!(bundle["link"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_previous_link() {
        let links = paging_links(&urls(), "/Patient", &request(15), false);
        let relations: Vec<&str> = links.iter().map(|l| l.relation.as_str()).collect();
        assert_eq!(relations, vec!["self", "previous"]);
        assert!(links[1].url.ends_with("_count=10&_offset=5"));
    }

    #[test]
    fn test_untenanted_links() {
        let links = paging_links(
            &TenantUrlContext::untenanted("http://localhost:8080"),
            "/_history",
            &SearchRequest {
                count: 20,
                ..Default::default()
            },
            false,
        );
        assert_eq!(links[0].url, "http://localhost:8080/_history?_count=20");
    }

    #[test]
    fn test_entry_without_id() {
        let entry = BundleEntry::for_resource(json!({"resourceType": "Patient"}), &urls());
        assert!(entry.full_url.is_none());
        assert!(entry.to_json().get("fullUrl").is_none());
    }
}
