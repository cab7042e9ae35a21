// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scrubber status` command implementation.
//!
//! Reads the database directly, so it works whether or not the bot is
//! running.

use std::io::IsTerminal;

use serde::Serialize;

use scrubber_config::model::ScrubberConfig;
use scrubber_core::{LoopStore, ScrubberError, SettingsStore, StorageAdapter};

use crate::serve::{database_exists, open_database};

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub database: String,
    pub initialized: bool,
    pub tracked_messages: usize,
    pub ingestion_enabled: bool,
    pub repost_delay_seconds: u64,
    pub loop_duration_seconds: u64,
}

/// Format seconds into a human-readable duration string.
fn format_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

async fn collect(config: &ScrubberConfig) -> Result<StatusResponse, ScrubberError> {
    let database = config.storage.database_path.clone();
    if !database_exists(config) {
        let defaults = scrubber_engine::initial_settings(&config.lifecycle);
        return Ok(StatusResponse {
            database,
            initialized: false,
            tracked_messages: 0,
            ingestion_enabled: defaults.ingestion_enabled,
            repost_delay_seconds: defaults.repost_delay_seconds,
            loop_duration_seconds: defaults.loop_duration_seconds,
        });
    }

    let storage = open_database(config).await?;
    let tracked_messages = storage.count().await?;
    let settings = storage.load().await?;
    storage.close().await?;

    Ok(StatusResponse {
        database,
        initialized: true,
        tracked_messages,
        ingestion_enabled: settings.ingestion_enabled,
        repost_delay_seconds: settings.repost_delay_seconds,
        loop_duration_seconds: settings.loop_duration_seconds,
    })
}

/// Run the `scrubber status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &ScrubberConfig,
    json: bool,
    plain: bool,
) -> Result<(), ScrubberError> {
    let status = collect(config).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  scrubber status");
    println!("  {}", "-".repeat(35));

    let state = if status.ingestion_enabled {
        "running"
    } else {
        "stopped"
    };
    if use_color {
        use colored::Colorize;
        if status.ingestion_enabled {
            println!("    Ingestion: {} {}", "✓".green(), state.green());
        } else {
            println!("    Ingestion: {} {}", "✗".red(), state.red());
        }
    } else if status.ingestion_enabled {
        println!("    Ingestion: [OK] {state}");
    } else {
        println!("    Ingestion: [STOPPED] {state}");
    }

    println!("    Tracked:   {}", status.tracked_messages);
    println!(
        "    Delay:     {}",
        format_duration(status.repost_delay_seconds)
    );
    if status.loop_duration_seconds == 0 {
        println!("    Duration:  single repost");
    } else {
        println!(
            "    Duration:  {}",
            format_duration(status.loop_duration_seconds)
        );
    }
    println!("    Database:  {}", status.database);
    if !status.initialized {
        println!();
        println!("  No database yet. Start with: scrubber serve");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(45), "45s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(125), "2m 5s");
    }

    #[test]
    fn format_duration_hours() {
        assert_eq!(format_duration(43200), "12h 0m");
    }

    #[test]
    fn format_duration_days() {
        assert_eq!(format_duration(90060), "1d 1h 1m");
    }

    #[tokio::test]
    async fn missing_database_reports_defaults_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScrubberConfig::default();
        config.storage.database_path = dir.path().join("absent.db").display().to_string();

        let status = collect(&config).await.unwrap();
        assert!(!status.initialized);
        assert_eq!(status.tracked_messages, 0);
        assert_eq!(status.repost_delay_seconds, 30);
        assert!(!dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn existing_database_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScrubberConfig::default();
        config.storage.database_path = dir.path().join("scrubber.db").display().to_string();
        config.lifecycle.default_repost_delay_secs = 20;
        open_database(&config).await.unwrap().close().await.unwrap();

        let status = collect(&config).await.unwrap();
        assert!(status.initialized);
        assert_eq!(status.repost_delay_seconds, 20);
    }

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            database: "/tmp/scrubber.db".to_string(),
            initialized: true,
            tracked_messages: 3,
            ingestion_enabled: true,
            repost_delay_seconds: 30,
            loop_duration_seconds: 0,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"tracked_messages\":3"));
        assert!(json.contains("\"ingestion_enabled\":true"));
    }
}
