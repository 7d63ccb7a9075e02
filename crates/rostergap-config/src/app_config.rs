//! Application configuration structures.

use rostergap_core::{Client, QueryKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Enrollment warehouse configuration.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Roster export configuration.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Query cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "rostergap".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Enable CORS.
    pub cors_enabled: bool,
    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the server bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Enrollment warehouse (Snowflake SQL API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Account identifier (`orgname-accountname`).
    pub account: String,
    /// User the programmatic access token belongs to.
    pub user: String,
    /// Programmatic access token.
    pub token: String,
    /// Virtual warehouse to execute statements on.
    pub warehouse: String,
    /// Database holding the enrollment table.
    pub database: String,
    /// Fully qualified enrollment table name.
    pub enrollment_table: String,
    /// Statement timeout in seconds.
    pub statement_timeout_secs: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            user: String::new(),
            token: String::new(),
            warehouse: String::new(),
            database: String::new(),
            enrollment_table: String::new(),
            statement_timeout_secs: 60,
        }
    }
}

impl WarehouseConfig {
    /// Returns the SQL API base URL for the configured account.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("https://{}.snowflakecomputing.com", self.account)
    }

    /// Returns the statement timeout as a Duration.
    #[must_use]
    pub const fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }

    /// Names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.account.is_empty() {
            missing.push("warehouse.account");
        }
        if self.user.is_empty() {
            missing.push("warehouse.user");
        }
        if self.token.is_empty() {
            missing.push("warehouse.token");
        }
        if self.warehouse.is_empty() {
            missing.push("warehouse.warehouse");
        }
        if self.database.is_empty() {
            missing.push("warehouse.database");
        }
        if self.enrollment_table.is_empty() {
            missing.push("warehouse.enrollment_table");
        }
        missing
    }
}

/// Roster export configuration: one export URL per supported
/// (client, data_type) combination, keyed `"{client}/{data_type}"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Export URLs by `"{client}/{data_type}"` key.
    #[serde(default)]
    pub exports: HashMap<String, String>,
    /// Fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

const fn default_fetch_timeout_secs() -> u64 {
    60
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            exports: HashMap::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl RosterConfig {
    /// Returns the export URL for a query key, if configured.
    #[must_use]
    pub fn export_url(&self, key: &QueryKey) -> Option<&str> {
        self.exports.get(&key.to_string()).map(String::as_str)
    }

    /// Returns the fetch timeout as a Duration.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Supported combinations that have no export URL configured.
    #[must_use]
    pub fn missing_exports(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for client in Client::all() {
            for data_type in client.data_types() {
                let key = format!("{}/{}", client, data_type);
                if !self.exports.contains_key(&key) {
                    missing.push(key);
                }
            }
        }
        missing
    }
}

/// Query cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the query cache (disable only for development).
    pub enabled: bool,
    /// Freshness window for completed entries, in seconds. Measured from
    /// the instant the entry was stored (fixed window, not sliding).
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600, // 1 hour
        }
    }
}

impl CacheConfig {
    /// Returns the freshness window as a Duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Verbose request/response logging.
    pub debug: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
        }
    }
}
