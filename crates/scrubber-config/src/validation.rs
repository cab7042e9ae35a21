// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::ScrubberConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ScrubberConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if let Some(token) = &config.telegram.bot_token {
        if token.trim().is_empty() {
            errors.push(ConfigError::validation(
                "telegram.bot_token must not be empty when set",
            ));
        }
    }

    if config.telegram.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "telegram.request_timeout_secs must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let lifecycle = &config.lifecycle;
    if lifecycle.min_repost_delay_secs == 0 {
        errors.push(ConfigError::validation(
            "lifecycle.min_repost_delay_secs must be at least 1",
        ));
    }
    if lifecycle.min_repost_delay_secs > lifecycle.max_repost_delay_secs {
        errors.push(ConfigError::validation(format!(
            "lifecycle.min_repost_delay_secs ({}) exceeds lifecycle.max_repost_delay_secs ({})",
            lifecycle.min_repost_delay_secs, lifecycle.max_repost_delay_secs
        )));
    } else if !(lifecycle.min_repost_delay_secs..=lifecycle.max_repost_delay_secs)
        .contains(&lifecycle.default_repost_delay_secs)
    {
        errors.push(ConfigError::validation(format!(
            "lifecycle.default_repost_delay_secs ({}) must lie within [{}, {}]",
            lifecycle.default_repost_delay_secs,
            lifecycle.min_repost_delay_secs,
            lifecycle.max_repost_delay_secs
        )));
    }

    if let Some(max) = lifecycle.max_loop_duration_secs {
        if lifecycle.default_loop_duration_secs > max {
            errors.push(ConfigError::validation(format!(
                "lifecycle.default_loop_duration_secs ({}) exceeds lifecycle.max_loop_duration_secs ({max})",
                lifecycle.default_loop_duration_secs
            )));
        }
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.gateway.enabled && config.gateway.port == 0 {
        errors.push(ConfigError::validation(
            "gateway.port must be non-zero when the gateway is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &ScrubberConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ScrubberConfig::default()).is_ok());
    }

    #[test]
    fn default_delay_outside_bounds_is_rejected() {
        let mut config = ScrubberConfig::default();
        config.lifecycle.default_repost_delay_secs = 400;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("default_repost_delay_secs"));
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let mut config = ScrubberConfig::default();
        config.lifecycle.min_repost_delay_secs = 100;
        config.lifecycle.max_repost_delay_secs = 10;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("exceeds")));
    }

    #[test]
    fn loop_duration_above_ceiling_is_rejected() {
        let mut config = ScrubberConfig::default();
        config.lifecycle.max_loop_duration_secs = Some(60);
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("max_loop_duration_secs")));
    }

    #[test]
    fn zero_loop_duration_is_allowed() {
        let mut config = ScrubberConfig::default();
        config.lifecycle.default_loop_duration_secs = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ScrubberConfig::default();
        config.agent.log_level = "loud".into();
        config.telegram.request_timeout_secs = 0;
        config.storage.database_path = "  ".into();
        config.gateway.host = "not a host!".into();
        assert_eq!(messages(&config).len(), 4);
    }
}
