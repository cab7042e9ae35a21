// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-persistent storage.
//!
//! Backs tests and the degraded mode used when `storage.required = false`
//! and the database cannot be opened. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scrubber_core::types::{ChatId, LoopId, LoopItem, MessageId, RuntimeSettings};
use scrubber_core::{
    AdapterType, HealthStatus, LoopStore, PluginAdapter, ScrubberError, SettingsStore,
    StorageAdapter,
};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<LoopId, LoopItem>>,
    settings: RwLock<RuntimeSettings>,
}

impl MemoryStorage {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ScrubberError> {
        Ok(HealthStatus::Degraded(
            "in-memory storage, items are lost on restart".to_string(),
        ))
    }

    async fn shutdown(&self) -> Result<(), ScrubberError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), ScrubberError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ScrubberError> {
        Ok(())
    }
}

#[async_trait]
impl LoopStore for MemoryStorage {
    async fn insert(&self, item: &LoopItem) -> Result<LoopId, ScrubberError> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(ScrubberError::Storage {
                source: format!("duplicate loop id {}", item.id).into(),
            });
        }
        items.insert(item.id.clone(), item.clone());
        Ok(item.id.clone())
    }

    async fn get(&self, id: &LoopId) -> Result<Option<LoopItem>, ScrubberError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn update_message_id(
        &self,
        id: &LoopId,
        new_message_id: MessageId,
    ) -> Result<bool, ScrubberError> {
        match self.items.write().await.get_mut(id) {
            Some(item) => {
                item.current_message_id = new_message_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &LoopId) -> Result<bool, ScrubberError> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<LoopItem>, ScrubberError> {
        let mut all: Vec<LoopItem> = self.items.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(all)
    }

    async fn delete_all(&self) -> Result<usize, ScrubberError> {
        let mut items = self.items.write().await;
        let removed = items.len();
        items.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, ScrubberError> {
        Ok(self.items.read().await.len())
    }

    async fn tracks_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<bool, ScrubberError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .any(|i| i.chat_id == chat_id && i.current_message_id == message_id))
    }
}

#[async_trait]
impl SettingsStore for MemoryStorage {
    async fn load(&self) -> Result<RuntimeSettings, ScrubberError> {
        Ok(*self.settings.read().await)
    }

    async fn save(&self, settings: &RuntimeSettings) -> Result<(), ScrubberError> {
        *self.settings.write().await = *settings;
        Ok(())
    }
}
