//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DOC_HISTORY_*)
//! 2. TOML config file (if DOC_HISTORY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How recency values are produced for live observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyStrategy {
    /// Wall-clock milliseconds since the Unix epoch.
    #[default]
    Clock,
    /// Logical counter incremented on every observation.
    Counter,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DOC_HISTORY_*)
/// 2. TOML config file (if DOC_HISTORY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite file backing the remote key-value store.
    ///
    /// Set via DOC_HISTORY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Maximum number of documents tracked at once.
    ///
    /// Set via DOC_HISTORY_MAX_DOCS environment variable.
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    /// Maximum number of omnibox suggestions.
    ///
    /// Set via DOC_HISTORY_MAX_RESULTS environment variable.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum seconds between persisted writes of an unchanged document.
    ///
    /// Set via DOC_HISTORY_PERSIST_INTERVAL_SECS environment variable.
    #[serde(default = "default_persist_interval_secs")]
    pub persist_interval_secs: u64,

    /// Recency source: "clock" or "counter".
    ///
    /// Set via DOC_HISTORY_RECENCY environment variable.
    #[serde(default)]
    pub recency: RecencyStrategy,

    /// URL glob handed to the tab-enumeration source at startup.
    ///
    /// Set via DOC_HISTORY_HOST_GLOB environment variable.
    #[serde(default = "default_host_glob")]
    pub host_glob: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./doc-history.sqlite")
}

fn default_max_docs() -> usize {
    100
}

fn default_max_results() -> usize {
    5
}

fn default_persist_interval_secs() -> u64 {
    15
}

fn default_host_glob() -> String {
    "*://docs.google.com/*".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_docs: default_max_docs(),
            max_results: default_max_results(),
            persist_interval_secs: default_persist_interval_secs(),
            recency: RecencyStrategy::default(),
            host_glob: default_host_glob(),
        }
    }
}

impl AppConfig {
    /// Persist debounce interval as a chrono Duration.
    pub fn persist_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.persist_interval_secs as i64)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `DOC_HISTORY_`
    /// 2. TOML file from `DOC_HISTORY_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("DOC_HISTORY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DOC_HISTORY_")
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
        assert_eq!(config.db_path, PathBuf::from("./doc-history.sqlite"));
        assert_eq!(config.max_docs, 100);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.persist_interval_secs, 15);
        assert_eq!(config.recency, RecencyStrategy::Clock);
        assert_eq!(config.host_glob, "*://docs.google.com/*");
    }

    #[test]
    fn test_persist_interval_duration() {
        let config = AppConfig::default();
        assert_eq!(config.persist_interval(), chrono::Duration::seconds(15));
    }

    #[test]
    fn test_recency_strategy_from_toml() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("recency = \"counter\"\nmax_docs = 20"))
            .extract()
            .unwrap();
        assert_eq!(config.recency, RecencyStrategy::Counter);
        assert_eq!(config.max_docs, 20);
        assert_eq!(config.max_results, 5);
    }
}
