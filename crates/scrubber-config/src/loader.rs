// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./scrubber.toml` > `~/.config/scrubber/scrubber.toml` > `/etc/scrubber/scrubber.toml`
//! with environment variable overrides via `SCRUBBER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ScrubberConfig;

/// Top-level sections addressable from `SCRUBBER_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &["agent", "telegram", "storage", "lifecycle", "gateway"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/scrubber/scrubber.toml` (system-wide)
/// 3. `~/.config/scrubber/scrubber.toml` (user XDG config)
/// 4. `./scrubber.toml` (local directory)
/// 5. Bare `TOKEN` and `PORT` environment variables
/// 6. `SCRUBBER_*` environment variables
pub fn load_config() -> Result<ScrubberConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ScrubberConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScrubberConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ScrubberConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScrubberConfig::default()))
        .merge(Toml::file(path))
        .merge(bare_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ScrubberConfig::default()))
        .merge(Toml::file("/etc/scrubber/scrubber.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("scrubber/scrubber.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("scrubber.toml"))
        .merge(bare_env_provider())
        .merge(env_provider())
}

/// `TOKEN` and `PORT` as set by common bot hosting platforms.
fn bare_env_provider() -> Env {
    Env::raw().only(&["TOKEN", "PORT"]).map(|key| {
        if key.as_str().eq_ignore_ascii_case("token") {
            "telegram.bot_token".into()
        } else {
            "gateway.port".into()
        }
    })
}

/// Create the prefixed environment provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SCRUBBER_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("SCRUBBER_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped variable name to a dotted config path.
///
/// Only the leading section is rewritten; unknown sections pass through
/// unchanged so `deny_unknown_fields` reports them.
pub(crate) fn map_env_key(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = lower.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    lower
}
