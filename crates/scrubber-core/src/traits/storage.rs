// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage ports: the durable Loop Store and the runtime Settings Store.

use async_trait::async_trait;

use crate::error::ScrubberError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, LoopId, LoopItem, MessageId, RuntimeSettings};

/// Lifecycle management for a storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ScrubberError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ScrubberError>;
}

/// Durable table of active lifecycle items.
///
/// Every operation is atomic for a single row. The `bool` returned by
/// [`update_message_id`](LoopStore::update_message_id) and
/// [`delete`](LoopStore::delete) is `false` when the row was absent; an
/// update never recreates a deleted row.
#[async_trait]
pub trait LoopStore: Send + Sync + 'static {
    async fn insert(&self, item: &LoopItem) -> Result<LoopId, ScrubberError>;

    async fn get(&self, id: &LoopId) -> Result<Option<LoopItem>, ScrubberError>;

    async fn update_message_id(
        &self,
        id: &LoopId,
        new_message_id: MessageId,
    ) -> Result<bool, ScrubberError>;

    async fn delete(&self, id: &LoopId) -> Result<bool, ScrubberError>;

    /// All rows, oldest first. Used by recovery at startup.
    async fn list_all(&self) -> Result<Vec<LoopItem>, ScrubberError>;

    /// Bulk administrative stop. Returns the number of rows removed.
    async fn delete_all(&self) -> Result<usize, ScrubberError>;

    async fn count(&self) -> Result<usize, ScrubberError>;

    /// Whether some row currently points at this exact message.
    async fn tracks_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<bool, ScrubberError>;
}

/// Single-row store for [`RuntimeSettings`].
#[async_trait]
pub trait SettingsStore: Send + Sync + 'static {
    async fn load(&self) -> Result<RuntimeSettings, ScrubberError>;

    async fn save(&self, settings: &RuntimeSettings) -> Result<(), ScrubberError>;
}
