// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-item execution unit.
//!
//! A unit owns nothing but its item id. Each cycle it sleeps for the current
//! repost delay, re-reads its row and then either expires the item or
//! reposts it. A missing row means the item was cancelled and the unit
//! exits without touching the chat.

use std::time::Duration;

use tracing::{debug, info, warn};

use scrubber_core::types::{ChatId, LoopId, LoopItem, MessageId, RuntimeSettings};
use scrubber_core::{ActionError, ScrubberError};

use crate::engine::LifecycleEngine;
use crate::recording;

/// Lower bound on a cycle so a corrupt settings row cannot spin a unit.
const MIN_CYCLE: Duration = Duration::from_secs(1);

/// What a single wake-up of a unit decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    /// Sleep again and run another cycle.
    Rearm,
    /// The row was gone; nothing was done.
    Cancelled,
    /// Deadline reached; message and row removed.
    Expired,
    /// Fire-once item reposted; row removed, copy left in place.
    Completed,
    /// Non-repostable item retired.
    Failed,
}

impl LifecycleEngine {
    pub(crate) async fn run_unit(&self, id: &LoopId) {
        let mut delay = RuntimeSettings::default().repost_delay();
        debug!(loop_id = %id, "execution unit started");

        loop {
            match self.inner.ports.settings.load().await {
                Ok(settings) => delay = settings.repost_delay().max(MIN_CYCLE),
                Err(e) => warn!(
                    loop_id = %id,
                    error = %e,
                    "settings unavailable, keeping previous delay"
                ),
            }

            tokio::select! {
                biased;
                _ = self.inner.shutdown.cancelled() => {
                    debug!(loop_id = %id, "shutdown requested, unit leaving row in place");
                    return;
                }
                _ = self.inner.ports.clock.sleep(delay) => {}
            }

            match self.cycle(id).await {
                Ok(CycleOutcome::Rearm) => {}
                Ok(outcome) => {
                    debug!(loop_id = %id, ?outcome, "execution unit finished");
                    return;
                }
                Err(e) => warn!(
                    loop_id = %id,
                    error = %e,
                    "store error during cycle, retrying next cycle"
                ),
            }
        }
    }

    pub(crate) async fn cycle(&self, id: &LoopId) -> Result<CycleOutcome, ScrubberError> {
        let Some(item) = self.inner.ports.loops.get(id).await? else {
            debug!(loop_id = %id, "row gone, unit cancelled");
            return Ok(CycleOutcome::Cancelled);
        };

        if item.is_expired(self.inner.ports.clock.now()) {
            return self.expire(&item).await;
        }
        self.repost(&item).await
    }

    async fn expire(&self, item: &LoopItem) -> Result<CycleOutcome, ScrubberError> {
        let content = &self.inner.ports.content;
        match content
            .delete_message(item.chat_id, item.current_message_id)
            .await
        {
            Ok(()) => {}
            Err(ActionError::NotFound(_)) => debug!(
                loop_id = %item.id,
                chat_id = %item.chat_id,
                message_id = %item.current_message_id,
                "expired message already gone"
            ),
            Err(ActionError::Transient(reason)) => {
                recording::record_failure("delete", "transient");
                warn!(
                    loop_id = %item.id,
                    chat_id = %item.chat_id,
                    message_id = %item.current_message_id,
                    %reason,
                    "could not delete expired message, retrying next cycle"
                );
                return Ok(CycleOutcome::Rearm);
            }
            Err(ActionError::Fatal(reason)) => {
                recording::record_failure("delete", "fatal");
                warn!(
                    loop_id = %item.id,
                    chat_id = %item.chat_id,
                    message_id = %item.current_message_id,
                    %reason,
                    "could not delete expired message, retiring item anyway"
                );
            }
        }

        self.inner.ports.loops.delete(&item.id).await?;
        recording::record_expired();
        info!(
            loop_id = %item.id,
            chat_id = %item.chat_id,
            message_id = %item.current_message_id,
            "item expired"
        );
        Ok(CycleOutcome::Expired)
    }

    async fn repost(&self, item: &LoopItem) -> Result<CycleOutcome, ScrubberError> {
        let ports = &self.inner.ports;
        let copy = match ports
            .content
            .copy_message(item.chat_id, item.current_message_id)
            .await
        {
            Ok(copy) => copy,
            Err(ActionError::Transient(reason)) => {
                recording::record_failure("copy", "transient");
                warn!(
                    loop_id = %item.id,
                    chat_id = %item.chat_id,
                    message_id = %item.current_message_id,
                    %reason,
                    "copy failed transiently, retrying next cycle"
                );
                return Ok(CycleOutcome::Rearm);
            }
            Err(err) => {
                let kind = if err.is_not_found() { "not_found" } else { "fatal" };
                recording::record_failure("copy", kind);
                warn!(
                    loop_id = %item.id,
                    chat_id = %item.chat_id,
                    message_id = %item.current_message_id,
                    error = %err,
                    "copy failed, retiring item"
                );
                ports.loops.delete(&item.id).await?;
                return Ok(CycleOutcome::Failed);
            }
        };

        // Point the row at the copy before removing the original so a crash
        // in between leaves the row on a message that still exists.
        let still_tracked = match ports.loops.update_message_id(&item.id, copy).await {
            Ok(tracked) => tracked,
            Err(e) => {
                self.discard(item, copy).await;
                return Err(e);
            }
        };
        if !still_tracked {
            debug!(loop_id = %item.id, "row removed mid-cycle, discarding fresh copy");
            self.discard(item, copy).await;
            return Ok(CycleOutcome::Cancelled);
        }

        match ports
            .content
            .delete_message(item.chat_id, item.current_message_id)
            .await
        {
            Ok(()) | Err(ActionError::NotFound(_)) => {}
            Err(err) => {
                let kind = if err.is_transient() { "transient" } else { "fatal" };
                recording::record_failure("delete", kind);
                warn!(
                    loop_id = %item.id,
                    chat_id = %item.chat_id,
                    message_id = %item.current_message_id,
                    error = %err,
                    "could not delete original after repost"
                );
            }
        }
        recording::record_repost();
        info!(
            loop_id = %item.id,
            chat_id = %item.chat_id,
            old_message_id = %item.current_message_id,
            message_id = %copy,
            "reposted"
        );

        if item.fire_once {
            ports.loops.delete(&item.id).await?;
            return Ok(CycleOutcome::Completed);
        }
        Ok(CycleOutcome::Rearm)
    }

    /// Best-effort removal of a copy that no row points at.
    async fn discard(&self, item: &LoopItem, copy: MessageId) {
        if let Err(err) = self.delete_quietly(item.chat_id, copy).await {
            warn!(
                loop_id = %item.id,
                chat_id = %item.chat_id,
                message_id = %copy,
                error = %err,
                "could not delete orphaned copy"
            );
        }
    }

    async fn delete_quietly(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), ActionError> {
        match self
            .inner
            .ports
            .content
            .delete_message(chat_id, message_id)
            .await
        {
            Err(ActionError::NotFound(_)) => Ok(()),
            other => other,
        }
    }
}
