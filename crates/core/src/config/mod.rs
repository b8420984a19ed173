//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VELLUM_*)
//! 2. TOML config file (if VELLUM_CONFIG_FILE set)
//! 3. Built-in defaults

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::registry::{Mapping, Registry, builtin_mappings};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Shared by the server (store, snapshots, bind address) and the client
/// (endpoint base, timeout, local cache medium).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite document store.
    ///
    /// Set via VELLUM_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory holding the immutable JSON snapshots.
    ///
    /// Set via VELLUM_SNAPSHOT_DIR environment variable.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Address the content server listens on.
    ///
    /// Set via VELLUM_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Base URL the client resolves endpoint paths against.
    ///
    /// Set via VELLUM_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side persistent cache file. When unset the client runs
    /// without a storage medium and the cache store is a no-op.
    ///
    /// Set via VELLUM_CACHE_PATH environment variable.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via VELLUM_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Default age after which cached content is painted as stale.
    ///
    /// Set via VELLUM_MAX_AGE_SECS environment variable.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// User-Agent string for client requests.
    ///
    /// Set via VELLUM_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Content name registry. Defaults to the built-in table.
    #[serde(default = "builtin_mappings")]
    pub mappings: Vec<Mapping>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./vellum.sqlite")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./snapshots")
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_age_secs() -> u64 {
    300
}

fn default_user_agent() -> String {
    "vellum/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            snapshot_dir: default_snapshot_dir(),
            bind_addr: default_bind_addr(),
            base_url: default_base_url(),
            cache_path: None,
            timeout_ms: default_timeout_ms(),
            max_age_secs: default_max_age_secs(),
            user_agent: default_user_agent(),
            mappings: builtin_mappings(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Build the shared content registry from the configured mappings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` on empty or duplicate names.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Registry::new(self.mappings.iter().cloned())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VELLUM_`
    /// 2. TOML file from `VELLUM_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VELLUM_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("VELLUM_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./vellum.sqlite"));
        assert_eq!(config.snapshot_dir, PathBuf::from("./snapshots"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(config.cache_path.is_none());
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.max_age_secs, 300);
        assert_eq!(config.user_agent, "vellum/0.1");
        assert_eq!(config.mappings, builtin_mappings());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
        assert_eq!(config.max_age(), Duration::from_secs(300));
    }

    #[test]
    fn test_registry_from_config() {
        let config = AppConfig::default();
        let registry = config.registry().unwrap();
        assert!(registry.contains("faq"));
        assert!(registry.contains("homepage"));
    }

    #[test]
    fn test_toml_mappings_override() {
        let toml = r#"
            timeout_ms = 2500

            [[mappings]]
            name = "faq"
            collection = "content"
            record_id = "faq-main"
            snapshot = "faq.json"
        "#;
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.mappings[0].record_id, "faq-main");
    }
}
