// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Backend API endpoint and transport settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Bearer credential settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Stats polling and read-cache settings.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Default list query settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the message backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts for an idempotent read, including the first.
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,

    /// Delay before the first read retry, in milliseconds. Doubles per
    /// attempt up to a fixed cap.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            read_attempts: default_read_attempts(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_read_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    250
}

/// Bearer credential configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// API token attached as a bearer credential. `None` sends
    /// unauthenticated requests (local development backends only).
    #[serde(default)]
    pub token: Option<String>,
}

/// Stats polling and read-cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StatsConfig {
    /// Stats polling interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Freshness window for cached reads, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    10
}

/// Default list query configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size for list queries.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Field to order list results by.
    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// Sort direction (`asc` or `desc`).
    #[serde(default = "default_order")]
    pub order: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            order_by: default_order_by(),
            order: default_order(),
        }
    }
}

fn default_limit() -> u32 {
    20
}

fn default_order_by() -> String {
    "created_at".to_string()
}

fn default_order() -> String {
    "desc".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
