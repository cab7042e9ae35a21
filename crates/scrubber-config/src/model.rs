// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Scrubber bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Scrubber configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScrubberConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Repost cycle defaults and bounds.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Liveness HTTP endpoint.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the help text.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "scrubber".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `scrubber serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Upper bound on any single Bot API call. Exceeding it counts as a
    /// transient failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a fetched administrator list is trusted per chat.
    #[serde(default = "default_admin_cache_secs")]
    pub admin_cache_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            admin_cache_secs: default_admin_cache_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_admin_cache_secs() -> u64 {
    600
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

    /// When `false`, an unopenable database degrades to in-memory tracking
    /// (no recovery across restarts) instead of aborting startup.
    #[serde(default = "default_storage_required")]
    pub required: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            required: default_storage_required(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("scrubber").join("scrubber.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("scrubber.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_storage_required() -> bool {
    true
}

/// Repost cycle defaults and bounds.
///
/// The `default_*` values seed the runtime settings row the first time the
/// database is created; afterwards the chat commands own those values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    #[serde(default = "default_repost_delay_secs")]
    pub default_repost_delay_secs: u64,

    #[serde(default = "default_min_repost_delay_secs")]
    pub min_repost_delay_secs: u64,

    #[serde(default = "default_max_repost_delay_secs")]
    pub max_repost_delay_secs: u64,

    /// `0` selects fire-once mode: one repost, no expiry, no loop.
    #[serde(default = "default_loop_duration_secs")]
    pub default_loop_duration_secs: u64,

    /// Optional ceiling for `/setduration`. `None` means unbounded.
    #[serde(default)]
    pub max_loop_duration_secs: Option<u64>,

    /// Whether new messages are tracked right after the first start.
    #[serde(default)]
    pub start_enabled: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_repost_delay_secs: default_repost_delay_secs(),
            min_repost_delay_secs: default_min_repost_delay_secs(),
            max_repost_delay_secs: default_max_repost_delay_secs(),
            default_loop_duration_secs: default_loop_duration_secs(),
            max_loop_duration_secs: None,
            start_enabled: false,
        }
    }
}

fn default_repost_delay_secs() -> u64 {
    30
}

fn default_min_repost_delay_secs() -> u64 {
    5
}

fn default_max_repost_delay_secs() -> u64 {
    300
}

fn default_loop_duration_secs() -> u64 {
    12 * 60 * 60
}

/// Liveness HTTP endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Serve `GET /` and `GET /health`.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}
