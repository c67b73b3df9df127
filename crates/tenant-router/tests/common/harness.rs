//! Test harness: an in-memory resource handler and server builders.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Extension;
use axum_test::TestServer;
use helios_tenant_router::backend::{
    HandlerError, HandlerResult, PatchDocument, RequestContext, ResourceHandler, SearchPage,
    SearchRequest,
};
use helios_tenant_router::tenant::IdentityClaims;
use helios_tenant_router::{AppState, ServerConfig, TenancyConfig, routing};
use serde_json::{Value, json};

use super::fixtures::{ALL_TENANTS_SCOPE, CLAIM_PATH, CLAIM_PREFIX, SERVER_URL};

const LAST_UPDATED: &str = "2024-01-05T10:30:00Z";
const UNTENANTED: &str = "-";

type Key = (String, String, String);

/// Resource handler keeping every version in memory, partitioned by tenant.
#[derive(Default)]
pub struct MemoryHandler {
    versions: Mutex<BTreeMap<Key, Vec<Value>>>,
    next_id: AtomicU64,
    throttled: AtomicBool,
    seen_tenants: Mutex<Vec<Option<String>>>,
}

impl MemoryHandler {
    /// Makes every operation fail with `TooManyConcurrentRequests`.
    pub fn throttle(&self) {
        self.throttled.store(true, Ordering::SeqCst);
    }

    /// Stores `resource` as version 1 in `tenant`.
    pub fn seed(&self, tenant: Option<&str>, resource: Value) {
        let resource_type = resource["resourceType"].as_str().unwrap_or_default().to_string();
        let id = resource["id"].as_str().unwrap_or_default().to_string();
        let stored = with_meta(resource, &id, 1);
        self.versions.lock().unwrap().insert(
            (tenant.unwrap_or(UNTENANTED).to_string(), resource_type, id),
            vec![stored],
        );
    }

    /// Returns the tenant of every handler call, in order.
    pub fn seen_tenants(&self) -> Vec<Option<String>> {
        self.seen_tenants.lock().unwrap().clone()
    }

    /// Returns the number of handler calls.
    pub fn calls(&self) -> usize {
        self.seen_tenants.lock().unwrap().len()
    }

    fn enter(&self, ctx: &RequestContext) -> HandlerResult<String> {
        let tenant = ctx.tenant_id().map(|t| t.as_str().to_string());
        self.seen_tenants.lock().unwrap().push(tenant.clone());
        if self.throttled.load(Ordering::SeqCst) {
            return Err(HandlerError::TooManyConcurrentRequests);
        }
        Ok(tenant.unwrap_or_else(|| UNTENANTED.to_string()))
    }

    fn store(&self, tenant: &str, resource_type: &str, id: &str, resource: Value) -> (Value, bool) {
        let mut versions = self.versions.lock().unwrap();
        let history = versions
            .entry((tenant.to_string(), resource_type.to_string(), id.to_string()))
            .or_default();
        let created = history.is_empty();
        let stored = with_meta(resource, id, history.len() as u64 + 1);
        history.push(stored.clone());
        (stored, created)
    }

    fn latest(&self, tenant: &str, resource_type: &str, id: &str) -> HandlerResult<Value> {
        self.versions
            .lock()
            .unwrap()
            .get(&(tenant.to_string(), resource_type.to_string(), id.to_string()))
            .and_then(|history| history.last().cloned())
            .ok_or_else(|| HandlerError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })
    }

    fn collect(
        &self,
        tenant: &str,
        filter: impl Fn(&Key) -> bool,
        all_versions: bool,
    ) -> Vec<Value> {
        self.versions
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.0 == tenant && filter(key))
            .flat_map(|(_, history)| {
                if all_versions {
                    history.iter().rev().cloned().collect::<Vec<_>>()
                } else {
                    history.last().cloned().into_iter().collect()
                }
            })
            .collect()
    }
}

fn with_meta(mut resource: Value, id: &str, version: u64) -> Value {
    resource["id"] = json!(id);
    resource["meta"] = json!({
        "versionId": version.to_string(),
        "lastUpdated": LAST_UPDATED
    });
    resource
}

fn page(matches: Vec<Value>, request: &SearchRequest) -> SearchPage {
    let total = matches.len();
    let resources: Vec<Value> = matches
        .into_iter()
        .skip(request.offset)
        .take(request.count)
        .collect();
    SearchPage {
        has_more: request.offset + resources.len() < total,
        resources,
        total: Some(total),
    }
}

#[async_trait]
impl ResourceHandler for MemoryHandler {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn resource_types(&self) -> Vec<String> {
        vec!["Patient".to_string(), "Observation".to_string()]
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        resource: Value,
    ) -> HandlerResult<Value> {
        let tenant = self.enter(ctx)?;
        let id = format!("p{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(self.store(&tenant, resource_type, &id, resource).0)
    }

    async fn read(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
    ) -> HandlerResult<Value> {
        let tenant = self.enter(ctx)?;
        self.latest(&tenant, resource_type, id)
    }

    async fn vread(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        version_id: &str,
    ) -> HandlerResult<Value> {
        let tenant = self.enter(ctx)?;
        self.versions
            .lock()
            .unwrap()
            .get(&(tenant, resource_type.to_string(), id.to_string()))
            .and_then(|history| {
                history
                    .iter()
                    .find(|v| v["meta"]["versionId"] == version_id)
                    .cloned()
            })
            .ok_or_else(|| HandlerError::VersionNotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                version_id: version_id.to_string(),
            })
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        resource: Value,
    ) -> HandlerResult<(Value, bool)> {
        let tenant = self.enter(ctx)?;
        Ok(self.store(&tenant, resource_type, id, resource))
    }

    async fn patch(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        patch: PatchDocument,
    ) -> HandlerResult<Value> {
        let tenant = self.enter(ctx)?;
        let mut resource = self.latest(&tenant, resource_type, id)?;
        patch.apply_json(&mut resource)?;
        Ok(self.store(&tenant, resource_type, id, resource).0)
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
    ) -> HandlerResult<()> {
        let tenant = self.enter(ctx)?;
        self.versions
            .lock()
            .unwrap()
            .remove(&(tenant, resource_type.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| HandlerError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })
    }

    async fn type_search(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage> {
        let tenant = self.enter(ctx)?;
        let matches = self.collect(&tenant, |key| key.1 == resource_type, false);
        Ok(page(matches, request))
    }

    async fn type_history(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage> {
        let tenant = self.enter(ctx)?;
        let matches = self.collect(&tenant, |key| key.1 == resource_type, true);
        Ok(page(matches, request))
    }

    async fn instance_history(
        &self,
        ctx: &RequestContext,
        resource_type: &str,
        id: &str,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage> {
        let tenant = self.enter(ctx)?;
        let matches = self.collect(&tenant, |key| key.1 == resource_type && key.2 == id, true);
        if matches.is_empty() {
            return Err(HandlerError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            });
        }
        Ok(page(matches, request))
    }

    async fn system_history(
        &self,
        ctx: &RequestContext,
        request: &SearchRequest,
    ) -> HandlerResult<SearchPage> {
        let tenant = self.enter(ctx)?;
        let matches = self.collect(&tenant, |_| true, true);
        Ok(page(matches, request))
    }

    async fn process_bundle(&self, ctx: &RequestContext, bundle: Value) -> HandlerResult<Value> {
        self.enter(ctx)?;
        let response_type = match bundle["type"].as_str() {
            Some("transaction") => "transaction-response",
            _ => "batch-response",
        };
        let entries = bundle["entry"].as_array().map_or(0, Vec::len);
        Ok(json!({
            "resourceType": "Bundle",
            "type": response_type,
            "entry": (0..entries)
                .map(|_| json!({ "response": { "status": "200 OK" } }))
                .collect::<Vec<_>>()
        }))
    }
}

/// Tenancy settings with the standard claim configuration.
pub fn tenancy(prefix: Option<&str>) -> TenancyConfig {
    TenancyConfig {
        enabled: true,
        tenant_url_part: prefix.map(str::to_string),
        tenant_claim_path: Some(CLAIM_PATH.to_string()),
        tenant_claim_value_prefix: Some(CLAIM_PREFIX.to_string()),
        all_tenants_scope: Some(ALL_TENANTS_SCOPE.to_string()),
    }
}

/// Server configuration for tests.
pub fn config(tenancy: TenancyConfig) -> ServerConfig {
    ServerConfig {
        base_url: SERVER_URL.to_string(),
        tenancy,
        ..ServerConfig::for_testing()
    }
}

/// A running test server and its handler.
pub struct TestContext {
    /// The HTTP test server.
    pub server: TestServer,
    /// The in-memory handler behind it.
    pub handler: Arc<MemoryHandler>,
}

impl TestContext {
    /// Starts a server for `config`, presenting `identity` on every request.
    pub fn new(config: ServerConfig, identity: IdentityClaims) -> Self {
        let handler = Arc::new(MemoryHandler::default());
        Self::with_handler(config, identity, handler)
    }

    /// Starts a server around an existing handler.
    pub fn with_handler(
        config: ServerConfig,
        identity: IdentityClaims,
        handler: Arc<MemoryHandler>,
    ) -> Self {
        let state = AppState::new(Arc::clone(&handler), config);
        let app = routing::create_routes(state).layer(Extension(identity));
        let server = TestServer::new(app).expect("Failed to create test server");
        Self { server, handler }
    }

    /// Starts a server without any caller identity.
    pub fn anonymous(config: ServerConfig) -> Self {
        Self::new(config, IdentityClaims::default())
    }
}
