// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram adapter for the Scrubber bot.
//!
//! [`TelegramContent`] implements the engine's [`ContentActionPort`] over the
//! Bot API via teloxide, with every request bounded by a timeout. The
//! [`dispatcher`] module runs long polling and routes updates to the admin
//! command layer or the lifecycle engine.

pub mod admins;
pub mod commands;
pub mod dispatcher;
pub mod errors;
pub mod handler;

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use teloxide::RequestError;
use teloxide::prelude::*;
use tracing::{debug, info};

use scrubber_config::model::TelegramConfig;
use scrubber_core::types::{self, AdapterType, HealthStatus};
use scrubber_core::{ActionError, ContentActionPort, PluginAdapter, ScrubberError};

pub use admins::AdminCache;
pub use commands::Command;
pub use dispatcher::run_dispatcher;

/// Registers descriptions for the Telegram adapter's metrics.
pub fn register_metrics() {
    describe_counter!(
        "scrubber_telegram_requests_total",
        "Bot API requests by method and outcome"
    );
    describe_counter!("scrubber_commands_total", "Admin commands received");
}

/// Bot API client implementing [`ContentActionPort`].
pub struct TelegramContent {
    bot: Bot,
    timeout: Duration,
}

impl TelegramContent {
    /// Creates the adapter. Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ScrubberError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ScrubberError::Config(
                "telegram.bot_token is required (set TOKEN or SCRUBBER_TELEGRAM_BOT_TOKEN)".into(),
            )
        })?;

        if token.is_empty() {
            return Err(ScrubberError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Runs one Bot API request under the configured timeout.
    async fn call<T, F>(&self, method: &'static str, request: F) -> Result<T, ActionError>
    where
        F: Future<Output = Result<T, RequestError>>,
    {
        let result = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(errors::classify(&e)),
            Err(_) => Err(ActionError::Transient(format!(
                "{method} timed out after {}s",
                self.timeout.as_secs()
            ))),
        };
        let outcome = match &result {
            Ok(_) => "ok",
            Err(ActionError::NotFound(_)) => "not_found",
            Err(ActionError::Transient(_)) => "transient",
            Err(ActionError::Fatal(_)) => "fatal",
        };
        counter!(
            "scrubber_telegram_requests_total",
            "method" => method,
            "outcome" => outcome
        )
        .increment(1);
        result
    }
}

fn tg_chat(chat_id: types::ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat_id.0)
}

fn tg_message(message_id: types::MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message_id.0)
}

#[async_trait]
impl PluginAdapter for TelegramContent {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ScrubberError> {
        match self.call("getMe", self.bot.get_me().send()).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ScrubberError> {
        debug!("Telegram adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl ContentActionPort for TelegramContent {
    async fn service_identity(&self) -> Result<types::UserId, ActionError> {
        let me = self.call("getMe", self.bot.get_me().send()).await?;
        info!(bot_id = me.user.id.0, username = ?me.user.username, "resolved bot identity");
        Ok(types::UserId(me.user.id.0))
    }

    async fn copy_message(
        &self,
        chat_id: types::ChatId,
        message_id: types::MessageId,
    ) -> Result<types::MessageId, ActionError> {
        let chat = tg_chat(chat_id);
        let copied = self
            .call(
                "copyMessage",
                self.bot
                    .copy_message(chat, chat, tg_message(message_id))
                    .send(),
            )
            .await?;
        Ok(types::MessageId(copied.0))
    }

    async fn delete_message(
        &self,
        chat_id: types::ChatId,
        message_id: types::MessageId,
    ) -> Result<(), ActionError> {
        self.call(
            "deleteMessage",
            self.bot
                .delete_message(tg_chat(chat_id), tg_message(message_id))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn list_administrators(
        &self,
        chat_id: types::ChatId,
    ) -> Result<HashSet<types::UserId>, ActionError> {
        let members = self
            .call(
                "getChatAdministrators",
                self.bot.get_chat_administrators(tg_chat(chat_id)).send(),
            )
            .await?;
        Ok(members
            .into_iter()
            .map(|m| types::UserId(m.user.id.0))
            .collect())
    }
}
