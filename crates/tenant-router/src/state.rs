//! Application state shared by every request handler.
//!
//! Holds the downstream resource handler, the server configuration and the
//! tenancy pipeline built from it.

use std::sync::Arc;

use crate::backend::ResourceHandler;
use crate::config::{ServerConfig, TenancyMode};
use crate::tenant::{TenancyPipeline, TenantUrlContext};

/// Shared application state.
///
/// # Type Parameters
///
/// * `H` - The resource handler type (must implement [`ResourceHandler`])
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenant_router::{AppState, ServerConfig};
/// use std::sync::Arc;
///
/// let state = AppState::new(Arc::new(MyHandler::default()), ServerConfig::default());
/// ```
pub struct AppState<H> {
    handler: Arc<H>,
    config: Arc<ServerConfig>,
    tenancy: Arc<TenancyPipeline>,
}

// H sits behind an Arc and need not be Clone.
impl<H> Clone for AppState<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
            tenancy: Arc::clone(&self.tenancy),
        }
    }
}

impl<H: ResourceHandler> AppState<H> {
    /// Creates the state and the tenancy pipeline for `config`.
    pub fn new(handler: Arc<H>, config: ServerConfig) -> Self {
        let tenancy = Arc::new(TenancyPipeline::from_config(&config));
        Self {
            handler,
            config: Arc::new(config),
            tenancy,
        }
    }

    /// Returns a reference to the resource handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the tenancy pipeline.
    pub fn tenancy(&self) -> &TenancyPipeline {
        &self.tenancy
    }

    /// Returns a clone of the tenancy pipeline Arc, for middleware state.
    pub fn tenancy_arc(&self) -> Arc<TenancyPipeline> {
        Arc::clone(&self.tenancy)
    }

    /// Returns the routing mode.
    pub fn tenancy_mode(&self) -> &TenancyMode {
        self.tenancy.mode()
    }

    /// Returns the server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.server_url()
    }

    /// Returns a URL context for `tenant_id`.
    pub fn url_context(&self, tenant_id: Option<&str>) -> TenantUrlContext {
        self.tenancy.url_context(tenant_id)
    }

    /// Returns the default page size for search results.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// Returns the maximum page size for search results.
    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }
}
