// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald dispatch engine.

use thiserror::Error;

/// The primary error type used across all Herald trait boundaries.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, missing required fields, no adapter registered).
    #[error("configuration error: {0}")]
    Config(String),

    /// Queue store errors (database connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Provider transport errors (provider fully unreachable, TLS failure).
    ///
    /// Ordinary provider-side send failures are NOT errors; they are reported
    /// as failed [`MessageResult`](crate::types::MessageResult)s.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested adapter was not found in the registry.
    #[error("adapter not found: {name}")]
    AdapterNotFound { name: String },

    /// Inbound webhook payload does not match the provider's known shape.
    #[error("webhook parse error ({provider}): {message}")]
    Parse { provider: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
