//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use rostergap_core::RostergapError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads and validates application configuration.
///
/// Configuration is loaded from multiple sources in order:
/// 1. `config/default.toml` - Default values
/// 2. `config/{environment}.toml` - Environment-specific overrides
/// 3. `config/local.toml` - Local overrides (not committed)
/// 4. Environment variables with `ROSTERGAP__` prefix
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    pub fn load(config_dir: &str) -> Result<AppConfig, RostergapError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("ROSTERGAP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        let default_path = format!("{}/default.toml", config_dir);
        if Path::new(&default_path).exists() {
            debug!("Loading default config from: {}", default_path);
            builder = builder.add_source(File::with_name(&default_path).required(false));
        }

        let env_path = format!("{}/{}.toml", config_dir, environment);
        if Path::new(&env_path).exists() {
            debug!("Loading environment config from: {}", env_path);
            builder = builder.add_source(File::with_name(&env_path).required(false));
        }

        let local_path = format!("{}/local.toml", config_dir);
        if Path::new(&local_path).exists() {
            debug!("Loading local config from: {}", local_path);
            builder = builder.add_source(File::with_name(&local_path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("ROSTERGAP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error)?;

        let app_config: AppConfig = config.try_deserialize().map_err(config_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<AppConfig, RostergapError> {
        Self::load("./config")
    }

    /// Validates the configuration, failing fast on missing credentials or
    /// roster exports so a misconfigured process never serves requests.
    fn validate_config(config: &AppConfig) -> Result<(), RostergapError> {
        let missing = config.warehouse.missing_fields();
        if !missing.is_empty() {
            return Err(RostergapError::Configuration(format!(
                "Missing required warehouse configuration: {}",
                missing.join(", ")
            )));
        }

        let missing_exports = config.roster.missing_exports();
        if !missing_exports.is_empty() {
            return Err(RostergapError::Configuration(format!(
                "Missing roster export URLs for: {}",
                missing_exports.join(", ")
            )));
        }

        if config.cache.enabled && config.cache.ttl_seconds == 0 {
            warn!("cache.ttl_seconds is 0; every request will refresh the cache");
        }

        Ok(())
    }
}

fn config_error(err: ConfigError) -> RostergapError {
    RostergapError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostergap_core::{Client, DataType, QueryKey};

    fn populated_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.warehouse.account = "org-acct".to_string();
        config.warehouse.user = "svc_rostergap".to_string();
        config.warehouse.token = "pat-token".to_string();
        config.warehouse.warehouse = "COMPUTE_WH".to_string();
        config.warehouse.database = "ANALYTICS".to_string();
        config.warehouse.enrollment_table = "ANALYTICS.PUBLIC.ENROLLMENTS".to_string();
        for client in Client::all() {
            for data_type in client.data_types() {
                config.roster.exports.insert(
                    format!("{}/{}", client, data_type),
                    format!("https://exports.example.com/{}/{}.json", client, data_type),
                );
            }
        }
        config
    }

    #[test]
    fn test_validate_accepts_populated_config() {
        assert!(ConfigLoader::validate_config(&populated_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_warehouse_fields() {
        let mut config = populated_config();
        config.warehouse.token = String::new();
        let err = ConfigLoader::validate_config(&config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("warehouse.token"));
    }

    #[test]
    fn test_validate_rejects_missing_roster_exports() {
        let mut config = populated_config();
        let key = QueryKey::new(Client::Goias, DataType::OtherComponents).unwrap();
        config.roster.exports.remove(&key.to_string());
        let err = ConfigLoader::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("goias/other_components"));
    }

    #[test]
    fn test_shipped_default_config_deserializes() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .unwrap();
        let app_config: AppConfig = config.try_deserialize().unwrap();

        assert_eq!(app_config.app.name, "rostergap");
        assert_eq!(app_config.app.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(app_config.server.port, 8000);
        assert_eq!(app_config.cache.ttl_seconds, 3600);
        assert_eq!(app_config.warehouse.statement_timeout_secs, 60);
    }

    #[test]
    fn test_partial_sections_fall_back_to_field_defaults() {
        let toml = r#"
            [warehouse]
            statement_timeout_secs = 10
        "#;
        let config = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap();
        let app_config: AppConfig = config.try_deserialize().unwrap();

        assert_eq!(app_config.warehouse.statement_timeout_secs, 10);
        assert!(app_config.warehouse.account.is_empty());

        // A sparse [warehouse] section reaches validation instead of a
        // serde missing-field error.
        let err = ConfigLoader::validate_config(&app_config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("warehouse.account"));
    }

    #[test]
    fn test_defaults_deserialize() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert!(config.cache.enabled);
        assert_eq!(config.app.name, "rostergap");
    }
}
