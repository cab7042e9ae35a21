// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin chat commands and the replies they produce.
//!
//! Parsing is done by teloxide's [`BotCommands`] derive; argument validation
//! and the engine calls live in [`execute`] so they can be tested without a
//! Bot API connection.

use teloxide::utils::command::BotCommands;
use tracing::warn;

use scrubber_core::ScrubberError;
use scrubber_core::types::EngineStatus;
use scrubber_engine::LifecycleEngine;

/// Reply sent to non-admins who try a command in a group.
pub const NOT_ADMIN: &str = "⛔ Sorry, this command can only be used by admins.";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Admin commands:")]
pub enum Command {
    #[command(description = "show this help.")]
    Start,
    #[command(description = "show this help.")]
    Help,
    #[command(description = "set the delete/repost delay in seconds.")]
    SetDelay(String),
    #[command(description = "set how long reposted content stays alive, 0 for a single repost.")]
    SetDuration(String),
    #[command(description = "start scrubbing new messages.")]
    StartScrub,
    #[command(description = "stop scrubbing and cancel every tracked message.")]
    StopScrub,
    #[command(description = "show the current status.")]
    Status,
}

impl Command {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::SetDelay(_) => "setdelay",
            Command::SetDuration(_) => "setduration",
            Command::StartScrub => "startscrub",
            Command::StopScrub => "stopscrub",
            Command::Status => "status",
        }
    }
}

/// Runs `command` against the engine and returns the text to reply with.
///
/// Engine failures are logged and turned into a short apology; they never
/// propagate to the dispatcher.
pub async fn execute(engine: &LifecycleEngine, command: Command) -> String {
    let label = command.label();
    match run(engine, command).await {
        Ok(reply) => reply,
        Err(ScrubberError::InvalidSetting(reason)) => format!("❗ {}.", capitalize(&reason)),
        Err(e) => {
            warn!(command = label, error = %e, "command failed");
            "⚠️ Something went wrong, please try again later.".to_string()
        }
    }
}

async fn run(engine: &LifecycleEngine, command: Command) -> Result<String, ScrubberError> {
    match command {
        Command::Start | Command::Help => Ok(help_text(engine)),
        Command::SetDelay(arg) => {
            let Some(seconds) = parse_seconds(&arg) else {
                return Ok(usage("setdelay", 30));
            };
            engine.set_delay(seconds).await?;
            Ok(format!("✅ Delay time has been set to {seconds} seconds."))
        }
        Command::SetDuration(arg) => {
            let Some(seconds) = parse_seconds(&arg) else {
                return Ok(usage("setduration", 3600));
            };
            engine.set_loop_duration(seconds).await?;
            if seconds == 0 {
                Ok("✅ New messages will be reposted once and then left alone.".to_string())
            } else {
                Ok(format!(
                    "✅ New messages will be reposted until {seconds} seconds have passed, then removed."
                ))
            }
        }
        Command::StartScrub => {
            engine.start_tracking().await?;
            Ok("🚀 Scrubber process has been started!\n\
                All messages will now be deleted and reposted after the set delay."
                .to_string())
        }
        Command::StopScrub => {
            let cancelled = engine.stop_all().await?;
            Ok(format!(
                "🛑 Scrubber process has been stopped. {cancelled} tracked message(s) cancelled."
            ))
        }
        Command::Status => Ok(status_text(&engine.status().await?)),
    }
}

fn parse_seconds(arg: &str) -> Option<u64> {
    let mut parts = arg.split_whitespace();
    let value = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(value)
}

fn usage(command: &str, example: u64) -> String {
    format!("Incorrect format! Please use it like this: /{command} {example}")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn help_text(engine: &LifecycleEngine) -> String {
    let limits = engine.limits();
    format!(
        "Hello! I am a Content Scrubber Bot.\n\n\
         I delete every message in the group after a set delay and repost it on my behalf. \
         This hides the name of the original sender.\n\n\
         Admin commands:\n\
         /setdelay <seconds> - time after which a message is deleted and reposted \
         ({}-{} s, e.g. /setdelay 15)\n\
         /setduration <seconds> - keep reposting for this long, then remove the message \
         (0 reposts once)\n\
         /startscrub - start the delete/repost process\n\
         /stopscrub - stop the process and cancel tracked messages\n\
         /status - check the bot's current status",
        limits.min_delay_secs, limits.max_delay_secs
    )
}

fn status_text(status: &EngineStatus) -> String {
    let process = if status.ingestion_enabled {
        "🟢 Running"
    } else {
        "🔴 Stopped"
    };
    let duration = if status.loop_duration_seconds == 0 {
        "single repost".to_string()
    } else {
        format!("{} seconds", status.loop_duration_seconds)
    };
    format!(
        "📊 Bot Status\n\n\
         🔹 Process: {process}\n\
         🔹 Delete/Repost Delay: {} seconds\n\
         🔹 Loop Duration: {duration}\n\
         🔹 Tracked Messages: {}",
        status.repost_delay_seconds, status.active_count
    )
}
