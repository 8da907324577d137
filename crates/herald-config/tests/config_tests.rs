// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Herald configuration system.

use herald_config::load_config_from_str;
use herald_config::model::HeraldConfig;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_herald_config() {
    let toml = r#"
[service]
log_level = "debug"

[dispatch]
queue_name = "bulk-sends"
poll_interval_secs = 2
batch_limit = 50
max_attempts = 5
retry_base_delay_secs = 10
retry_max_delay_secs = 600
retry_channel_capacity = 128

[storage]
database_path = "/tmp/herald-test.db"
wal_mode = false

[provider]
active = "whatsapp"

[whatsapp]
access_token = "EAAG-test"
phone_number_id = "123456"
app_secret = "shh"
api_base = "http://localhost:9999"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.dispatch.queue_name, "bulk-sends");
    assert_eq!(config.dispatch.poll_interval_secs, 2);
    assert_eq!(config.dispatch.batch_limit, 50);
    assert_eq!(config.dispatch.max_attempts, 5);
    assert_eq!(config.dispatch.retry_base_delay_secs, 10);
    assert_eq!(config.dispatch.retry_max_delay_secs, 600);
    assert_eq!(config.storage.database_path, "/tmp/herald-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.provider.active.as_deref(), Some("whatsapp"));
    assert_eq!(config.whatsapp.access_token.as_deref(), Some("EAAG-test"));
    assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("123456"));
    assert_eq!(config.whatsapp.api_base, "http://localhost:9999");
}

/// Empty config falls back to compiled defaults everywhere.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should deserialize");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.dispatch.queue_name, "campaign-dispatch");
    assert_eq!(config.dispatch.poll_interval_secs, 5);
    assert_eq!(config.dispatch.batch_limit, 20);
    assert_eq!(config.dispatch.max_attempts, 3);
    assert!(config.storage.wal_mode);
    assert!(config.provider.active.is_none());
    assert!(config.whatsapp.access_token.is_none());
}

/// Unknown field in [dispatch] is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_dispatch_produces_error() {
    let toml = r#"
[dispatch]
max_atempts = 4
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_atempts"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_produces_error() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// Partial sections keep defaults for omitted fields.
#[test]
fn partial_dispatch_section_keeps_other_defaults() {
    let toml = r#"
[dispatch]
max_attempts = 7
"#;

    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.dispatch.max_attempts, 7);
    assert_eq!(config.dispatch.batch_limit, 20);
    assert_eq!(config.dispatch.queue_name, "campaign-dispatch");
}

/// Default structs round-trip through serde.
#[test]
fn default_config_serializes() {
    let config = HeraldConfig::default();
    let toml = toml::to_string(&config).expect("defaults should serialize");
    assert!(toml.contains("queue_name"));
}
