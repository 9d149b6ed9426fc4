// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier client layer.

use thiserror::Error;

/// The primary error type used across the Courier repository and facade.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Network/HTTP-layer failure: no response, 5xx, or a malformed body.
    /// Reads may be retried; writes surface to the caller.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend rejected the request with a decoded `{error}` envelope.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Incomplete payload, caught locally before any network call.
    #[error("validation error: {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The backend reports no message with this id.
    #[error("message not found: {id}")]
    NotFound { id: String },

    /// Configuration errors (invalid TOML, bad values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Whether a read may be retried after this error. Only transport-layer
    /// failures qualify; writes are never retried regardless.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CourierError::Transport { .. })
    }
}
