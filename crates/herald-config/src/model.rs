// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald dispatch engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Process-level settings (logging).
    #[serde(default)]
    pub service: ServiceConfig,

    /// Campaign dispatch queue settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Active provider selection.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// WhatsApp Cloud API adapter settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Campaign dispatch queue and retry policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Logical queue name; tenant isolation is carried inside each item.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum due entries processed per poll cycle.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Attempts before an item is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base retry delay in seconds. Zero re-enqueues immediately.
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,

    /// Upper bound on the exponential retry delay, in seconds.
    #[serde(default = "default_retry_max_delay_secs")]
    pub retry_max_delay_secs: u64,

    /// Capacity of the in-process retry request channel.
    #[serde(default = "default_retry_channel_capacity")]
    pub retry_channel_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_name: default_queue_name(),
            poll_interval_secs: default_poll_interval_secs(),
            batch_limit: default_batch_limit(),
            max_attempts: default_max_attempts(),
            retry_base_delay_secs: default_retry_base_delay_secs(),
            retry_max_delay_secs: default_retry_max_delay_secs(),
            retry_channel_capacity: default_retry_channel_capacity(),
        }
    }
}

fn default_queue_name() -> String {
    "campaign-dispatch".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_batch_limit() -> usize {
    20
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_secs() -> u64 {
    30
}

fn default_retry_max_delay_secs() -> u64 {
    3600
}

fn default_retry_channel_capacity() -> usize {
    256
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "herald.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Active provider selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider name to activate at startup. `None` selects the first
    /// registered adapter.
    #[serde(default)]
    pub active: Option<String>,
}

/// WhatsApp Cloud API adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API access token. `None` disables the adapter.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Sender phone number id assigned by the platform.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// App secret used to verify webhook signatures.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// API base URL; overridable for testing.
    #[serde(default = "default_whatsapp_api_base")]
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            app_secret: None,
            api_base: default_whatsapp_api_base(),
        }
    }
}

fn default_whatsapp_api_base() -> String {
    "https://graph.facebook.com/v21.0".to_string()
}
