// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content Action Port: the platform operations the engine performs.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, MessageId, UserId};

/// Copy / delete operations against a chat platform, each independently
/// failable.
///
/// Implementations must bound every call with a timeout and report it as
/// [`ActionError::Transient`], distinct from a definitive
/// [`ActionError::NotFound`].
#[async_trait]
pub trait ContentActionPort: PluginAdapter {
    /// The platform identity the service posts under.
    async fn service_identity(&self) -> Result<UserId, ActionError>;

    /// Posts a copy of `message_id` into the same chat under the service
    /// identity and returns the id of the new message.
    async fn copy_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, ActionError>;

    /// Deletes a message. `NotFound` means it is already gone and callers
    /// treat it as success.
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
    -> Result<(), ActionError>;

    /// User ids of the chat's administrators.
    async fn list_administrators(&self, chat_id: ChatId) -> Result<HashSet<UserId>, ActionError>;
}
