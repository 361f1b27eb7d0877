// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Wolfpack presence service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use wolfpack_core::types::{Gender, InteractionKind, Role};

/// Top-level Wolfpack configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WolfpackConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Membership session lifecycle.
    #[serde(default)]
    pub membership: MembershipConfig,

    /// Access policy limits.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Interaction ledger settings.
    #[serde(default)]
    pub interactions: InteractionsConfig,

    /// Event bus settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// HTTP/WebSocket gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Sender -> receiver compatibility rules for directed interactions.
    #[serde(default)]
    pub compatibility: CompatibilityConfig,

    /// Venues seeded into storage at startup.
    #[serde(default)]
    pub locations: Vec<LocationConfig>,

    /// Static bearer tokens for local runs. Production deployments plug in a
    /// real identity provider instead.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "wolfpack".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("wolfpack").join("wolfpack.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("wolfpack.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Membership session lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipConfig {
    /// Sessions idle for longer than this are expired by the reaper.
    #[serde(default = "default_inactivity_window_secs")]
    pub inactivity_window_secs: u64,

    /// How often the reaper sweeps for stale sessions.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on a single admission call at the gateway.
    #[serde(default = "default_admission_timeout_ms")]
    pub admission_timeout_ms: u64,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            inactivity_window_secs: default_inactivity_window_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            admission_timeout_ms: default_admission_timeout_ms(),
        }
    }
}

fn default_inactivity_window_secs() -> u64 {
    3_600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_admission_timeout_ms() -> u64 {
    5_000
}

/// Access policy limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Orders a member may have pending before further orders are rate limited.
    #[serde(default = "default_max_pending_orders")]
    pub max_pending_orders: u32,

    /// Unread messages a member may have outstanding at a location before
    /// further messages are rate limited.
    #[serde(default = "default_max_unread_messages")]
    pub max_unread_messages: u32,

    /// Catalog items the static catalog reports as unavailable.
    #[serde(default)]
    pub unavailable_items: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_pending_orders: default_max_pending_orders(),
            max_unread_messages: default_max_unread_messages(),
            unavailable_items: Vec::new(),
        }
    }
}

fn default_max_pending_orders() -> u32 {
    3
}

fn default_max_unread_messages() -> u32 {
    5
}

/// Interaction ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionsConfig {
    /// Seconds until a sent interaction stops being surfaced as new.
    #[serde(default = "default_interaction_ttl_secs")]
    pub ttl_secs: u64,

    /// Hand recorded interactions to the push notifier.
    #[serde(default = "default_push_enabled")]
    pub push_enabled: bool,
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_interaction_ttl_secs(),
            push_enabled: default_push_enabled(),
        }
    }
}

fn default_interaction_ttl_secs() -> u64 {
    86_400
}

fn default_push_enabled() -> bool {
    true
}

/// Event bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Capacity of each per-scope broadcast channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Page size used when replaying persisted events.
    #[serde(default = "default_replay_page_size")]
    pub replay_page_size: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            replay_page_size: default_replay_page_size(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_replay_page_size() -> usize {
    500
}

/// HTTP/WebSocket gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Serve the gateway from `wolfpack serve`.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Maximum in-flight requests before the gateway sheds load.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_max_concurrent_requests() -> usize {
    1024
}

/// Compatibility rule table. Rules are checked in order; the first rule that
/// matches the sender, receiver, and kind decides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompatibilityConfig {
    /// Decision when no rule matches.
    #[serde(default = "default_allow")]
    pub default_allow: bool,

    #[serde(default)]
    pub rules: Vec<CompatibilityRuleConfig>,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            default_allow: default_allow(),
            rules: Vec::new(),
        }
    }
}

fn default_allow() -> bool {
    true
}

/// One compatibility rule. Unset selectors match anything.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompatibilityRuleConfig {
    #[serde(default)]
    pub sender: Option<Gender>,

    #[serde(default)]
    pub receiver: Option<Gender>,

    /// Interaction kinds this rule applies to. Empty means all kinds.
    #[serde(default)]
    pub kinds: Vec<InteractionKind>,

    pub allow: bool,
}

/// A venue registered from configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// A static bearer token mapped to an identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub token: String,
    pub user_id: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub display_name: Option<String>,
}
