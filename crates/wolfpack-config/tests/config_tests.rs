// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Wolfpack configuration system.

use std::io::Write;

use wolfpack_config::diagnostic::ConfigError;
use wolfpack_config::model::WolfpackConfig;
use wolfpack_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use wolfpack_core::types::{Gender, InteractionKind, Role};

/// A full config with every section deserializes.
#[test]
fn valid_toml_deserializes_into_wolfpack_config() {
    let toml = r#"
[service]
name = "den"
log_level = "debug"

[storage]
database_path = "/tmp/wolfpack-test.db"
wal_mode = false

[membership]
inactivity_window_secs = 1800
sweep_interval_secs = 30
admission_timeout_ms = 2000

[policy]
max_pending_orders = 2
max_unread_messages = 4
unavailable_items = ["absinthe"]

[interactions]
ttl_secs = 600
push_enabled = false

[bus]
channel_capacity = 64
replay_page_size = 100

[gateway]
host = "0.0.0.0"
port = 8088

[compatibility]
default_allow = false

[[compatibility.rules]]
sender = "male"
receiver = "male"
kinds = ["wink"]
allow = false

[[locations]]
id = "den"
name = "The Den"
latitude = 34.0522
longitude = -118.2437
radius_meters = 100.0

[[tokens]]
token = "dj-token"
user_id = "dj-1"
role = "dj"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "den");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/wolfpack-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.membership.inactivity_window_secs, 1800);
    assert_eq!(config.membership.sweep_interval_secs, 30);
    assert_eq!(config.membership.admission_timeout_ms, 2000);
    assert_eq!(config.policy.max_pending_orders, 2);
    assert_eq!(config.policy.unavailable_items, vec!["absinthe"]);
    assert_eq!(config.interactions.ttl_secs, 600);
    assert!(!config.interactions.push_enabled);
    assert_eq!(config.bus.channel_capacity, 64);
    assert_eq!(config.gateway.port, 8088);
    assert!(!config.compatibility.default_allow);
    assert_eq!(config.compatibility.rules.len(), 1);
    assert_eq!(config.compatibility.rules[0].sender, Some(Gender::Male));
    assert_eq!(config.compatibility.rules[0].kinds, vec![InteractionKind::Wink]);
    assert_eq!(config.locations.len(), 1);
    assert_eq!(config.locations[0].radius_meters, 100.0);
    assert_eq!(config.tokens[0].role, Role::Dj);
    assert_eq!(config.tokens[0].gender, Gender::Unspecified);
}

/// The effective config serializes back to TOML that loads unchanged.
#[test]
fn default_config_round_trips_through_toml() {
    let mut config = WolfpackConfig::default();
    config.membership.inactivity_window_secs = 1800;
    config.gateway.port = 9090;

    let rendered = toml::to_string(&config).expect("config should serialize");
    let reloaded = load_config_from_str(&rendered).expect("rendered TOML should load");

    assert_eq!(reloaded.membership.inactivity_window_secs, 1800);
    assert_eq!(reloaded.gateway.port, 9090);
    assert_eq!(reloaded.service.name, config.service.name);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.name, "wolfpack");
    assert_eq!(config.service.log_level, "info");
    assert!(config.storage.wal_mode);
    assert_eq!(config.membership.inactivity_window_secs, 3600);
    assert_eq!(config.membership.sweep_interval_secs, 60);
    assert_eq!(config.membership.admission_timeout_ms, 5000);
    assert_eq!(config.policy.max_pending_orders, 3);
    assert_eq!(config.policy.max_unread_messages, 5);
    assert_eq!(config.interactions.ttl_secs, 86_400);
    assert_eq!(config.bus.channel_capacity, 256);
    assert_eq!(config.bus.replay_page_size, 500);
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert!(config.compatibility.default_allow);
    assert!(config.locations.is_empty());
    assert!(config.tokens.is_empty());
}

#[test]
fn unknown_field_in_membership_is_rejected() {
    let toml = r#"
[membership]
inactivty_window_secs = 10
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("inactivty_window_secs"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[agent]
name = "x"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn diagnostic_suggests_correct_membership_key() {
    let toml = r#"
[membership]
inactivty_window_secs = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "inactivty_window_secs"
                && suggestion.as_deref() == Some("inactivity_window_secs")
                && valid_keys.contains("sweep_interval_secs")
        })
    });
    assert!(found, "expected suggestion for the misspelled key, got: {errors:?}");
}

#[test]
fn missing_location_field_is_reported() {
    let toml = r#"
[[locations]]
id = "den"
name = "The Den"
latitude = 34.0
longitude = -118.0
"#;

    let errors = load_and_validate_str(toml).expect_err("radius is required");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key.contains("radius_meters"))),
        "got: {errors:?}"
    );
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("port must be numeric");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[bus]
channel_capacity = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero capacity is invalid");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { key, .. } if key == "bus.channel_capacity")
    ));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "radius_meter".to_string(),
        suggestion: Some("radius_meters".to_string()),
        valid_keys: "id, name, latitude, longitude, radius_meters".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `radius_meters`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("radius_meter"));
}

#[test]
fn file_config_loads_with_span_on_typo() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[storage]\ndatabase_pth = \"/tmp/x.db\"").unwrap();

    let errors = load_and_validate_path(file.path()).expect_err("typo should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion, .. } if suggestion.as_deref() == Some("database_path")
    )));
}

#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "wolfpack.toml",
            r#"
[membership]
inactivity_window_secs = 1200
"#,
        )?;
        jail.set_env("WOLFPACK_MEMBERSHIP_INACTIVITY_WINDOW_SECS", "900");
        jail.set_env("WOLFPACK_GATEWAY_PORT", "9000");

        let path = jail.directory().join("wolfpack.toml");
        let config: WolfpackConfig = load_config_from_path(&path)?;
        assert_eq!(config.membership.inactivity_window_secs, 900);
        assert_eq!(config.gateway.port, 9000);
        Ok(())
    });
}
