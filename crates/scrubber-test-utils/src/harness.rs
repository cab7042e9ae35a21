// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end lifecycle testing.
//!
//! `TestHarness` wires a [`LifecycleEngine`] to a [`MockContentPort`], a
//! [`PausedClock`] and either in-memory or temp-file SQLite storage.
//! [`TestHarness::restart`] builds a fresh engine over the same store and
//! chat, which is how recovery is exercised.

use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use scrubber_config::model::StorageConfig;
use scrubber_core::types::{ChatId, InboundContent, LoopItem, MessageId, RuntimeSettings, UserId};
use scrubber_core::{LoopStore, ScrubberError, SettingsStore, StorageAdapter};
use scrubber_engine::{EnginePorts, LifecycleEngine, SettingLimits};
use scrubber_storage::{MemoryStorage, SqliteStorage};

use crate::clock::PausedClock;
use crate::mock_content::MockContentPort;

/// A regular group member used as the default sender.
pub const MEMBER: UserId = UserId(7);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    settings: RuntimeSettings,
    limits: SettingLimits,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            settings: RuntimeSettings {
                ingestion_enabled: true,
                ..RuntimeSettings::default()
            },
            limits: SettingLimits::default(),
            sqlite: false,
        }
    }

    pub fn with_delay(mut self, seconds: u64) -> Self {
        self.settings.repost_delay_seconds = seconds;
        self
    }

    pub fn with_loop_duration(mut self, seconds: u64) -> Self {
        self.settings.loop_duration_seconds = seconds;
        self
    }

    /// Start with ingestion disabled, as a freshly installed bot would.
    pub fn ingestion_disabled(mut self) -> Self {
        self.settings.ingestion_enabled = false;
        self
    }

    pub fn with_limits(mut self, limits: SettingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Back the engine with a SQLite file in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, ScrubberError> {
        let (loops, settings, temp_dir): (Arc<dyn LoopStore>, Arc<dyn SettingsStore>, _) =
            if self.sqlite {
                let dir = tempfile::tempdir().map_err(ScrubberError::storage)?;
                let config = StorageConfig {
                    database_path: dir.path().join("scrubber.db").display().to_string(),
                    wal_mode: true,
                    required: true,
                };
                let storage = Arc::new(SqliteStorage::new(config, self.settings));
                storage.initialize().await?;
                (
                    storage.clone() as Arc<dyn LoopStore>,
                    storage as Arc<dyn SettingsStore>,
                    Some(dir),
                )
            } else {
                let storage = Arc::new(MemoryStorage::new(self.settings));
                (
                    storage.clone() as Arc<dyn LoopStore>,
                    storage as Arc<dyn SettingsStore>,
                    None,
                )
            };

        let port = MockContentPort::new();
        let clock = PausedClock::default();
        let shutdown = CancellationToken::new();
        let engine = LifecycleEngine::new(
            EnginePorts {
                loops: loops.clone(),
                settings: settings.clone(),
                content: Arc::new(port.clone()),
                clock: Arc::new(clock),
            },
            self.limits,
            shutdown.clone(),
        );

        Ok(TestHarness {
            engine,
            port,
            loops,
            settings,
            clock,
            limits: self.limits,
            shutdown,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine over mock adapters.
pub struct TestHarness {
    pub engine: LifecycleEngine,
    pub port: MockContentPort,
    pub loops: Arc<dyn LoopStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub clock: PausedClock,
    limits: SettingLimits,
    shutdown: CancellationToken,
    _temp_dir: Option<TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A member posts a message in `chat_id` and the engine receives it.
    pub async fn receive(&self, chat_id: ChatId) -> Result<Option<LoopItem>, ScrubberError> {
        self.receive_from(chat_id, Some(MEMBER)).await
    }

    /// Like [`receive`](Self::receive) with an explicit sender.
    pub async fn receive_from(
        &self,
        chat_id: ChatId,
        origin: Option<UserId>,
    ) -> Result<Option<LoopItem>, ScrubberError> {
        let message_id = self.port.post(chat_id).await;
        self.engine
            .track_new(&InboundContent {
                chat_id,
                message_id,
                origin,
            })
            .await
    }

    /// The message the item currently points at, if the item still exists.
    pub async fn current_message(&self, item: &LoopItem) -> Option<MessageId> {
        self.loops
            .get(&item.id)
            .await
            .ok()
            .flatten()
            .map(|row| row.current_message_id)
    }

    /// Simulates a process restart: stops every unit and returns a fresh
    /// engine over the same store, chat and clock. Recovery is not run.
    pub async fn restart(&mut self) -> LifecycleEngine {
        self.engine.shutdown().await;
        self.shutdown = CancellationToken::new();
        self.engine = LifecycleEngine::new(
            EnginePorts {
                loops: self.loops.clone(),
                settings: self.settings.clone(),
                content: Arc::new(self.port.clone()),
                clock: Arc::new(self.clock),
            },
            self.limits,
            self.shutdown.clone(),
        );
        self.engine.clone()
    }

    /// Stops all units.
    pub async fn shutdown(&self) {
        self.engine.shutdown().await;
    }
}
