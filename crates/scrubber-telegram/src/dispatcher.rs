// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-polling update loop.
//!
//! Commands go through the admin gate to [`commands::execute`]; every other
//! trackable message is handed to the engine's `track_new`.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scrubber_engine::LifecycleEngine;

use crate::TelegramContent;
use crate::admins::AdminCache;
use crate::commands::{self, Command, NOT_ADMIN};
use crate::handler;

/// Polls for updates until `shutdown` is cancelled.
pub async fn run_dispatcher(
    port: Arc<TelegramContent>,
    engine: LifecycleEngine,
    admins: Arc<AdminCache>,
    shutdown: CancellationToken,
) {
    if shutdown.is_cancelled() {
        return;
    }

    let schema = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(dptree::filter(|msg: Message| handler::should_track(&msg)).endpoint(on_content));

    let bot = port.bot().clone();
    let mut dispatcher = Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![engine, admins, port])
        .default_handler(|_| async {})
        .build();

    let token = dispatcher.shutdown_token();
    let watcher = tokio::spawn(async move {
        shutdown.cancelled().await;
        // The token refuses while the dispatcher is still starting up.
        loop {
            match token.shutdown() {
                Ok(stopped) => {
                    stopped.await;
                    break;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
    });

    info!("starting Telegram long polling");
    dispatcher.dispatch().await;
    watcher.abort();
    info!("Telegram long polling stopped");
}

async fn on_command(
    bot: Bot,
    msg: Message,
    command: Command,
    engine: LifecycleEngine,
    admins: Arc<AdminCache>,
    port: Arc<TelegramContent>,
) -> ResponseResult<()> {
    counter!("scrubber_commands_total", "command" => command.label()).increment(1);

    let chat_id = handler::to_inbound(&msg).chat_id;
    let allowed = match handler::sender(&msg) {
        Some(user) => admins
            .is_admin(port.as_ref(), chat_id, user, handler::is_private(&msg))
            .await
            .unwrap_or_else(|e| {
                warn!(chat_id = %chat_id, error = %e, "could not fetch administrators");
                false
            }),
        None => false,
    };

    let reply = if allowed {
        commands::execute(&engine, command).await
    } else {
        debug!(chat_id = %chat_id, command = command.label(), "command from non-admin refused");
        NOT_ADMIN.to_string()
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn on_content(msg: Message, engine: LifecycleEngine) -> ResponseResult<()> {
    let event = handler::to_inbound(&msg);
    if let Err(e) = engine.track_new(&event).await {
        warn!(
            chat_id = %event.chat_id,
            message_id = %event.message_id,
            error = %e,
            "failed to start tracking message"
        );
    }
    Ok(())
}
