//! Server configuration for the tenant router.
//!
//! This module provides configuration types for the server, supporting both
//! programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REST_SERVER_PORT` | 8080 | Server port |
//! | `REST_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `REST_LOG_LEVEL` | info | Log level |
//! | `REST_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `REST_ENABLE_CORS` | true | Enable CORS |
//! | `REST_CORS_ORIGINS` | * | Allowed origins |
//! | `REST_CORS_METHODS` | GET,POST,PUT,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `REST_CORS_HEADERS` | Content-Type,Authorization,Accept,If-Match,Prefer | Allowed headers |
//! | `REST_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `REST_DEFAULT_PAGE_SIZE` | 20 | Default `_count` |
//! | `REST_MAX_PAGE_SIZE` | 1000 | Upper bound for `_count` |
//! | `REST_MULTITENANCY_ENABLED` | false | Route every request through a tenant segment |
//! | `REST_TENANT_URL_PART` | (none) | Literal segment preceding the tenant, e.g. `tenant` |
//! | `REST_TENANT_CLAIM_PATH` | (none) | Claim listing the caller's tenants, e.g. `cognito:groups` |
//! | `REST_TENANT_CLAIM_VALUE_PREFIX` | (none) | Prefix of each tenant entry in that claim |
//! | `REST_ALL_TENANTS_SCOPE` | (none) | Scope granting access to every tenant |
//!
//! # Example
//!
//! ```rust
//! use helios_tenant_router::{ServerConfig, TenancyConfig, TenancyMode};
//!
//! let config = ServerConfig {
//!     tenancy: TenancyConfig {
//!         enabled: true,
//!         tenant_url_part: Some("tenant".to_string()),
//!         tenant_claim_path: Some("cognito:groups".to_string()),
//!         tenant_claim_value_prefix: Some("tenantprefix:".to_string()),
//!         all_tenants_scope: Some("tenants/all".to_string()),
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(
//!     config.tenancy.mode(),
//!     TenancyMode::EnabledWithPrefix("tenant".to_string())
//! );
//! ```

use clap::{Args, Parser};

/// Server configuration.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "tenant-router")]
#[command(about = "Multi-tenant FHIR RESTful API router")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "REST_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "REST_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "REST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "REST_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "REST_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_METHODS",
        default_value = "GET,POST,PUT,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,If-Match,Prefer"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers, Bundle links and
    /// audience matching).
    #[arg(long, env = "REST_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Default page size for search and history results.
    #[arg(long, env = "REST_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for search and history results.
    #[arg(long, env = "REST_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,

    /// Multi-tenancy settings.
    #[command(flatten)]
    pub tenancy: TenancyConfig,
}

/// Multi-tenancy settings.
///
/// Read once at startup. The router derives a [`TenancyMode`] from it and never
/// consults the raw flags again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct TenancyConfig {
    /// Require a tenant segment in every request URL.
    #[arg(
        long = "multitenancy",
        env = "REST_MULTITENANCY_ENABLED",
        default_value = "false"
    )]
    pub enabled: bool,

    /// Literal path segment preceding the tenant ID (e.g. `tenant` for
    /// `/tenant/{tenantId}/Patient`).
    #[arg(long, env = "REST_TENANT_URL_PART")]
    pub tenant_url_part: Option<String>,

    /// Identity claim listing the tenants a caller may access.
    #[arg(long, env = "REST_TENANT_CLAIM_PATH")]
    pub tenant_claim_path: Option<String>,

    /// Prefix of each tenant entry in the tenant claim (e.g. `tenantprefix:`).
    #[arg(long, env = "REST_TENANT_CLAIM_VALUE_PREFIX")]
    pub tenant_claim_value_prefix: Option<String>,

    /// Scope that grants access to every tenant (e.g. `tenants/all`).
    #[arg(long, env = "REST_ALL_TENANTS_SCOPE")]
    pub all_tenants_scope: Option<String>,
}

/// How requests are mapped to tenants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenancyMode {
    /// Single-tenant: paths start at the resource type.
    Disabled,
    /// `/{tenantId}/{ResourceType}/...`
    EnabledNoPrefix,
    /// `/{prefix}/{tenantId}/{ResourceType}/...`
    EnabledWithPrefix(String),
}

impl TenancyMode {
    /// Returns `true` unless multi-tenancy is disabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TenancyMode::Disabled)
    }

    /// Returns the configured tenant URL part, if any.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            TenancyMode::EnabledWithPrefix(prefix) => Some(prefix),
            _ => None,
        }
    }
}

impl TenancyConfig {
    /// Returns the routing mode described by this configuration.
    pub fn mode(&self) -> TenancyMode {
        if !self.enabled {
            return TenancyMode::Disabled;
        }
        match self.tenant_url_part.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => {
                TenancyMode::EnabledWithPrefix(prefix.to_string())
            }
            _ => TenancyMode::EnabledNoPrefix,
        }
    }

    /// Validates the tenancy settings, appending problems to `errors`.
    fn validate_into(&self, errors: &mut Vec<String>) {
        if let Some(part) = &self.tenant_url_part {
            let trimmed = part.trim_matches('/');
            if trimmed.is_empty() || trimmed.contains('/') {
                errors.push(format!(
                    "Tenant URL part must be a single path segment, got '{}'",
                    part
                ));
            }
        }

        if matches!(&self.tenant_claim_path, Some(path) if path.trim().is_empty()) {
            errors.push("Tenant claim path cannot be empty".to_string());
        }

        if self.tenant_claim_value_prefix.is_some() && self.tenant_claim_path.is_none() {
            errors.push("Tenant claim value prefix requires a tenant claim path".to_string());
        }

        if matches!(&self.all_tenants_scope, Some(scope) if scope.trim().is_empty()) {
            errors.push("All-tenants scope cannot be empty".to_string());
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,If-Match,Prefer".to_string(),
            base_url: "http://localhost:8080".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
            tenancy: TenancyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from `REST_*` variables and the command line,
    /// falling back to defaults if parsing fails.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the base URL without a trailing slash.
    pub fn server_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(format!("Base URL '{}' cannot be a base", self.base_url));
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("Invalid base URL '{}': {}", self.base_url, e)),
        }

        self.tenancy.validate_into(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A configuration for in-process tests: ephemeral port, no CORS, small
    /// pages and multi-tenancy off.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}
