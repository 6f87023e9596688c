//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Upper bound on tracked documents; the store scans linearly on eviction.
const MAX_DOCS_LIMIT: usize = 10_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_docs` is 0 or exceeds 10000
    /// - `max_results` is 0 or exceeds `max_docs`
    /// - `persist_interval_secs` exceeds one hour
    ///
    /// Returns `ConfigError::Missing` if `host_glob` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_docs == 0 {
            return Err(ConfigError::Invalid { field: "max_docs".into(), reason: "must be greater than 0".into() });
        }
        if self.max_docs > MAX_DOCS_LIMIT {
            return Err(ConfigError::Invalid {
                field: "max_docs".into(),
                reason: format!("must not exceed {MAX_DOCS_LIMIT}"),
            });
        }

        if self.max_results == 0 {
            return Err(ConfigError::Invalid { field: "max_results".into(), reason: "must be greater than 0".into() });
        }
        if self.max_results > self.max_docs {
            return Err(ConfigError::Invalid {
                field: "max_results".into(),
                reason: "must not exceed max_docs".into(),
            });
        }

        if self.persist_interval_secs > 3600 {
            return Err(ConfigError::Invalid {
                field: "persist_interval_secs".into(),
                reason: "must not exceed 1 hour (3600s)".into(),
            });
        }

        if self.host_glob.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "host_glob".into(),
                hint: "Set DOC_HISTORY_HOST_GLOB environment variable".into(),
            });
        }

        if self.persist_interval_secs == 0 {
            tracing::warn!("persist_interval_secs is 0; every live observation will be written to the remote store");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_docs_zero() {
        let config = AppConfig { max_docs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_docs"));
    }

    #[test]
    fn test_validate_max_docs_exceeds_limit() {
        let config = AppConfig { max_docs: 10_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_docs"));
    }

    #[test]
    fn test_validate_max_results_zero() {
        let config = AppConfig { max_results: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_results"));
    }

    #[test]
    fn test_validate_max_results_above_capacity() {
        let config = AppConfig { max_docs: 3, max_results: 5, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_results"));
    }

    #[test]
    fn test_validate_persist_interval_too_long() {
        let config = AppConfig { persist_interval_secs: 3601, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "persist_interval_secs"));
    }

    #[test]
    fn test_validate_empty_host_glob() {
        let config = AppConfig { host_glob: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "host_glob"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config =
            AppConfig { max_docs: 1, max_results: 1, persist_interval_secs: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig { max_docs: 10_000, persist_interval_secs: 3600, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
