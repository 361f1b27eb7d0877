// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wolfpack.toml` > `~/.config/wolfpack/wolfpack.toml`
//! > `/etc/wolfpack/wolfpack.toml` with environment variable overrides via the
//! `WOLFPACK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WolfpackConfig;

/// Config sections addressable from the environment. `WOLFPACK_<SECTION>_<KEY>`
/// maps to `<section>.<key>`.
const ENV_SECTIONS: &[&str] = &[
    "service",
    "storage",
    "membership",
    "policy",
    "interactions",
    "bus",
    "gateway",
    "compatibility",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wolfpack/wolfpack.toml` (system-wide)
/// 3. `~/.config/wolfpack/wolfpack.toml` (user XDG config)
/// 4. `./wolfpack.toml` (local directory)
/// 5. `WOLFPACK_*` environment variables
pub fn load_config() -> Result<WolfpackConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults (no XDG lookup,
/// no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<WolfpackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WolfpackConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WolfpackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WolfpackConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WolfpackConfig::default()))
        .merge(Toml::file("/etc/wolfpack/wolfpack.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wolfpack/wolfpack.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wolfpack.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `WOLFPACK_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name is turned into a dot,
/// so `WOLFPACK_MEMBERSHIP_INACTIVITY_WINDOW_SECS` lands on
/// `membership.inactivity_window_secs`.
fn env_provider() -> Env {
    Env::prefixed("WOLFPACK_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    key.to_string()
}
