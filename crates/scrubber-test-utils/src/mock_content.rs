// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock content action port for deterministic testing.
//!
//! `MockContentPort` models a set of chats as the set of messages currently
//! visible in them. Copying a visible message adds a new one; deleting removes
//! it; touching a message that is not visible yields `NotFound`, exactly as
//! the real platform would. Failures can be scripted per call.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use scrubber_core::types::{AdapterType, ChatId, HealthStatus, MessageId, UserId};
use scrubber_core::{ActionError, ContentActionPort, PluginAdapter, ScrubberError};

/// Identity the mock reports for the bot unless overridden.
pub const MOCK_BOT_ID: UserId = UserId(4_242);

/// One successful `copy_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRecord {
    pub chat_id: ChatId,
    pub source: MessageId,
    pub copy: MessageId,
}

#[derive(Debug, Default)]
struct State {
    visible: HashSet<(ChatId, MessageId)>,
    copies: Vec<CopyRecord>,
    delete_calls: Vec<(ChatId, MessageId)>,
    copy_failures: VecDeque<ActionError>,
    delete_failures: VecDeque<ActionError>,
    admins: HashMap<ChatId, HashSet<UserId>>,
    admin_lookups: usize,
    last_id: i32,
}

/// A scriptable in-memory chat platform.
#[derive(Clone)]
pub struct MockContentPort {
    identity: UserId,
    state: Arc<Mutex<State>>,
}

impl MockContentPort {
    pub fn new() -> Self {
        Self::with_identity(MOCK_BOT_ID)
    }

    pub fn with_identity(identity: UserId) -> Self {
        Self {
            identity,
            state: Arc::new(Mutex::new(State {
                last_id: 100,
                ..State::default()
            })),
        }
    }

    /// Simulates a user posting a message; returns its id.
    pub async fn post(&self, chat_id: ChatId) -> MessageId {
        let mut state = self.state.lock().await;
        state.last_id += 1;
        let id = MessageId(state.last_id);
        state.visible.insert((chat_id, id));
        id
    }

    /// Makes a specific message id visible, e.g. to rebuild a chat after a restart.
    pub async fn seed(&self, chat_id: ChatId, message_id: MessageId) {
        let mut state = self.state.lock().await;
        state.last_id = state.last_id.max(message_id.0);
        state.visible.insert((chat_id, message_id));
    }

    /// Removes a message without going through the port, as a user or
    /// another admin would.
    pub async fn remove_externally(&self, chat_id: ChatId, message_id: MessageId) {
        self.state.lock().await.visible.remove(&(chat_id, message_id));
    }

    pub async fn is_visible(&self, chat_id: ChatId, message_id: MessageId) -> bool {
        self.state.lock().await.visible.contains(&(chat_id, message_id))
    }

    /// Visible messages in `chat_id`, ascending.
    pub async fn visible(&self, chat_id: ChatId) -> Vec<MessageId> {
        let state = self.state.lock().await;
        let mut ids: Vec<MessageId> = state
            .visible
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    pub async fn copies(&self) -> Vec<CopyRecord> {
        self.state.lock().await.copies.clone()
    }

    /// Every delete attempt, including ones that failed.
    pub async fn delete_calls(&self) -> Vec<(ChatId, MessageId)> {
        self.state.lock().await.delete_calls.clone()
    }

    /// The next `copy_message` call fails with `err`. Calls queue up.
    pub async fn fail_next_copy(&self, err: ActionError) {
        self.state.lock().await.copy_failures.push_back(err);
    }

    /// The next `delete_message` call fails with `err`. Calls queue up.
    pub async fn fail_next_delete(&self, err: ActionError) {
        self.state.lock().await.delete_failures.push_back(err);
    }

    pub async fn set_admins(&self, chat_id: ChatId, admins: impl IntoIterator<Item = UserId>) {
        self.state
            .lock()
            .await
            .admins
            .insert(chat_id, admins.into_iter().collect());
    }

    pub async fn admin_lookups(&self) -> usize {
        self.state.lock().await.admin_lookups
    }
}

impl Default for MockContentPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockContentPort {
    fn name(&self) -> &str {
        "mock-content"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ScrubberError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ScrubberError> {
        Ok(())
    }
}

#[async_trait]
impl ContentActionPort for MockContentPort {
    async fn service_identity(&self) -> Result<UserId, ActionError> {
        Ok(self.identity)
    }

    async fn copy_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, ActionError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.copy_failures.pop_front() {
            return Err(err);
        }
        if !state.visible.contains(&(chat_id, message_id)) {
            return Err(ActionError::NotFound(format!(
                "message {message_id} not found in chat {chat_id}"
            )));
        }
        state.last_id += 1;
        let copy = MessageId(state.last_id);
        state.visible.insert((chat_id, copy));
        state.copies.push(CopyRecord {
            chat_id,
            source: message_id,
            copy,
        });
        Ok(copy)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), ActionError> {
        let mut state = self.state.lock().await;
        state.delete_calls.push((chat_id, message_id));
        if let Some(err) = state.delete_failures.pop_front() {
            return Err(err);
        }
        if state.visible.remove(&(chat_id, message_id)) {
            Ok(())
        } else {
            Err(ActionError::NotFound(format!(
                "message {message_id} to delete not found"
            )))
        }
    }

    async fn list_administrators(&self, chat_id: ChatId) -> Result<HashSet<UserId>, ActionError> {
        let mut state = self.state.lock().await;
        state.admin_lookups += 1;
        Ok(state.admins.get(&chat_id).cloned().unwrap_or_default())
    }
}
