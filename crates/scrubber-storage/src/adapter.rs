// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage ports.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use scrubber_config::model::StorageConfig;
use scrubber_core::types::{ChatId, LoopId, LoopItem, MessageId, RuntimeSettings};
use scrubber_core::{
    AdapterType, HealthStatus, LoopStore, PluginAdapter, ScrubberError, SettingsStore,
    StorageAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed Loop Store and Settings Store.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// call fails until then. On first initialization the settings row is
/// seeded from the value given to [`SqliteStorage::new`].
pub struct SqliteStorage {
    config: StorageConfig,
    seed: RuntimeSettings,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig, seed: RuntimeSettings) -> Self {
        Self {
            config,
            seed,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ScrubberError> {
        self.db.get().ok_or_else(|| ScrubberError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ScrubberError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ScrubberError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ScrubberError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        if queries::settings::seed(&db, &self.seed).await? {
            info!(
                repost_delay_seconds = self.seed.repost_delay_seconds,
                loop_duration_seconds = self.seed.loop_duration_seconds,
                "seeded runtime settings"
            );
        }
        self.db.set(db).map_err(|_| ScrubberError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ScrubberError> {
        self.db()?.checkpoint().await
    }
}

#[async_trait]
impl LoopStore for SqliteStorage {
    async fn insert(&self, item: &LoopItem) -> Result<LoopId, ScrubberError> {
        queries::loops::insert(self.db()?, item).await
    }

    async fn get(&self, id: &LoopId) -> Result<Option<LoopItem>, ScrubberError> {
        queries::loops::get(self.db()?, id).await
    }

    async fn update_message_id(
        &self,
        id: &LoopId,
        new_message_id: MessageId,
    ) -> Result<bool, ScrubberError> {
        queries::loops::update_message_id(self.db()?, id, new_message_id).await
    }

    async fn delete(&self, id: &LoopId) -> Result<bool, ScrubberError> {
        queries::loops::delete(self.db()?, id).await
    }

    async fn list_all(&self) -> Result<Vec<LoopItem>, ScrubberError> {
        queries::loops::list_all(self.db()?).await
    }

    async fn delete_all(&self) -> Result<usize, ScrubberError> {
        queries::loops::delete_all(self.db()?).await
    }

    async fn count(&self) -> Result<usize, ScrubberError> {
        queries::loops::count(self.db()?).await
    }

    async fn tracks_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<bool, ScrubberError> {
        queries::loops::tracks_message(self.db()?, chat_id, message_id).await
    }
}

#[async_trait]
impl SettingsStore for SqliteStorage {
    async fn load(&self) -> Result<RuntimeSettings, ScrubberError> {
        Ok(queries::settings::load(self.db()?)
            .await?
            .unwrap_or(self.seed))
    }

    async fn save(&self, settings: &RuntimeSettings) -> Result<(), ScrubberError> {
        queries::settings::save(self.db()?, settings).await
    }
}
