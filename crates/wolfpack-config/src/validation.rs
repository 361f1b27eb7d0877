// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde cannot express: positive windows,
//! sane coordinates, unique location ids and tokens.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::WolfpackConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest accepted window, interval, or TTL: one year.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest accepted admission timeout, in milliseconds.
pub const MAX_ADMISSION_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &WolfpackConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "service.log_level",
            format!(
                "`{}` is not one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    let membership = &config.membership;
    for (key, value, max) in [
        (
            "membership.inactivity_window_secs",
            membership.inactivity_window_secs,
            MAX_WINDOW_SECS,
        ),
        (
            "membership.sweep_interval_secs",
            membership.sweep_interval_secs,
            MAX_WINDOW_SECS,
        ),
        (
            "membership.admission_timeout_ms",
            membership.admission_timeout_ms,
            MAX_ADMISSION_TIMEOUT_MS,
        ),
        ("interactions.ttl_secs", config.interactions.ttl_secs, MAX_WINDOW_SECS),
    ] {
        if value == 0 {
            errors.push(ConfigError::invalid(key, "must be greater than zero"));
        } else if value > max {
            errors.push(ConfigError::invalid(
                key,
                format!("must be at most {max}, got {value}"),
            ));
        }
    }

    if config.bus.channel_capacity == 0 {
        errors.push(ConfigError::invalid(
            "bus.channel_capacity",
            "must be greater than zero",
        ));
    }
    if config.bus.replay_page_size == 0 {
        errors.push(ConfigError::invalid(
            "bus.replay_page_size",
            "must be greater than zero",
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("gateway.host", "must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::invalid(
            "gateway.host",
            format!("`{host}` is not a valid IP address or hostname"),
        ));
    }

    let mut location_ids = HashSet::new();
    for (i, loc) in config.locations.iter().enumerate() {
        if loc.id.trim().is_empty() {
            errors.push(ConfigError::invalid(
                format!("locations[{i}].id"),
                "must not be empty",
            ));
        } else if !location_ids.insert(loc.id.as_str()) {
            errors.push(ConfigError::invalid(
                format!("locations[{i}].id"),
                format!("duplicate location id `{}`", loc.id),
            ));
        }
        if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude)
        {
            errors.push(ConfigError::invalid(
                format!("locations[{i}]"),
                format!(
                    "coordinates ({}, {}) are outside WGS-84 bounds",
                    loc.latitude, loc.longitude
                ),
            ));
        }
        if !loc.radius_meters.is_finite() || loc.radius_meters <= 0.0 {
            errors.push(ConfigError::invalid(
                format!("locations[{i}].radius_meters"),
                format!("must be a positive number of meters, got {}", loc.radius_meters),
            ));
        }
    }

    let mut tokens = HashSet::new();
    for (i, token) in config.tokens.iter().enumerate() {
        if token.token.is_empty() || token.user_id.trim().is_empty() {
            errors.push(ConfigError::invalid(
                format!("tokens[{i}]"),
                "token and user_id must not be empty",
            ));
        } else if !tokens.insert(token.token.as_str()) {
            errors.push(ConfigError::invalid(
                format!("tokens[{i}].token"),
                "duplicate token",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
