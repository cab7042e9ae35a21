// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scrubber - anonymizing repost bot for Telegram groups.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod status;
mod stop;

use clap::{Parser, Subcommand};

/// Scrubber - reposts group messages under the bot's own name.
#[derive(Parser, Debug)]
#[command(name = "scrubber", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot: recover tracked messages, poll Telegram, serve liveness.
    Serve,
    /// Show tracked message count and runtime settings from the database.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Disable ingestion and cancel every tracked message.
    Stop,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match scrubber_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            scrubber_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Stop) => stop::run_stop(&config).await,
        None => {
            println!("scrubber: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
