// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::CourierConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must use http:// or https://"),
        });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be positive".to_string(),
        });
    }

    if config.api.read_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "api.read_attempts must be at least 1".to_string(),
        });
    }

    if config.stats.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "stats.poll_interval_secs must be positive".to_string(),
        });
    }

    if config.query.default_limit == 0 || config.query.default_limit > 100 {
        errors.push(ConfigError::Validation {
            message: format!(
                "query.default_limit must be between 1 and 100, got {}",
                config.query.default_limit
            ),
        });
    }

    if config.query.order != "asc" && config.query.order != "desc" {
        errors.push(ConfigError::Validation {
            message: format!("query.order must be `asc` or `desc`, got `{}`", config.query.order),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.log.level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let mut config = CourierConfig::default();
        config.api.base_url = "ftp://nope".to_string();
        config.query.default_limit = 0;
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "errors must not fail fast: {errors:?}");
    }
}
