// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Control surface used by the chat command layer.
//!
//! Every change is written to the Settings Store; units re-read it at the
//! top of each cycle, so new values reach all active items on their next
//! wake without restarting anything.

use tracing::info;

use scrubber_config::model::LifecycleConfig;
use scrubber_core::types::{EngineStatus, RuntimeSettings};
use scrubber_core::ScrubberError;

use crate::engine::LifecycleEngine;

/// Bounds enforced on runtime setting changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingLimits {
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    /// `None` leaves the loop duration unbounded.
    pub max_loop_duration_secs: Option<u64>,
}

impl Default for SettingLimits {
    fn default() -> Self {
        Self {
            min_delay_secs: 5,
            max_delay_secs: 300,
            max_loop_duration_secs: None,
        }
    }
}

impl From<&LifecycleConfig> for SettingLimits {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            min_delay_secs: config.min_repost_delay_secs,
            max_delay_secs: config.max_repost_delay_secs,
            max_loop_duration_secs: config.max_loop_duration_secs,
        }
    }
}

/// Settings written the first time a store is created.
pub fn initial_settings(config: &LifecycleConfig) -> RuntimeSettings {
    RuntimeSettings {
        repost_delay_seconds: config.default_repost_delay_secs,
        loop_duration_seconds: config.default_loop_duration_secs,
        ingestion_enabled: config.start_enabled,
    }
}

impl LifecycleEngine {
    pub fn limits(&self) -> SettingLimits {
        self.inner.limits
    }

    /// Turns ingestion on. Already-running units are unaffected.
    pub async fn start_tracking(&self) -> Result<RuntimeSettings, ScrubberError> {
        let settings = self
            .update_settings(|s| s.ingestion_enabled = true)
            .await?;
        info!("ingestion enabled");
        Ok(settings)
    }

    /// Turns ingestion off and cancels every tracked item.
    ///
    /// Cancellation is row deletion: each unit notices on its next wake and
    /// exits without touching the chat. Returns the number of rows removed.
    pub async fn stop_all(&self) -> Result<usize, ScrubberError> {
        let _guard = self.inner.settings_lock.write().await;
        self.apply_settings(|s| s.ingestion_enabled = false).await?;
        let removed = self.inner.ports.loops.delete_all().await?;
        info!(removed, "ingestion disabled, all items cancelled");
        Ok(removed)
    }

    pub async fn status(&self) -> Result<EngineStatus, ScrubberError> {
        let settings = self.inner.ports.settings.load().await?;
        let active_count = self.inner.ports.loops.count().await?;
        Ok(EngineStatus {
            active_count,
            ingestion_enabled: settings.ingestion_enabled,
            repost_delay_seconds: settings.repost_delay_seconds,
            loop_duration_seconds: settings.loop_duration_seconds,
        })
    }

    /// Changes the repost delay for new and in-flight items.
    pub async fn set_delay(&self, seconds: u64) -> Result<RuntimeSettings, ScrubberError> {
        let limits = self.inner.limits;
        if !(limits.min_delay_secs..=limits.max_delay_secs).contains(&seconds) {
            return Err(ScrubberError::InvalidSetting(format!(
                "repost delay must be between {} and {} seconds",
                limits.min_delay_secs, limits.max_delay_secs
            )));
        }
        let settings = self
            .update_settings(|s| s.repost_delay_seconds = seconds)
            .await?;
        info!(repost_delay_seconds = seconds, "repost delay changed");
        Ok(settings)
    }

    /// Changes the loop duration applied to items tracked from now on.
    ///
    /// Existing items keep the deadline computed when they were created.
    /// Zero selects fire-once mode.
    pub async fn set_loop_duration(&self, seconds: u64) -> Result<RuntimeSettings, ScrubberError> {
        if let Some(max) = self.inner.limits.max_loop_duration_secs {
            if seconds > max {
                return Err(ScrubberError::InvalidSetting(format!(
                    "loop duration must be at most {max} seconds"
                )));
            }
        }
        let settings = self
            .update_settings(|s| s.loop_duration_seconds = seconds)
            .await?;
        info!(loop_duration_seconds = seconds, "loop duration changed");
        Ok(settings)
    }

    async fn update_settings(
        &self,
        change: impl FnOnce(&mut RuntimeSettings),
    ) -> Result<RuntimeSettings, ScrubberError> {
        let _guard = self.inner.settings_lock.write().await;
        self.apply_settings(change).await
    }

    /// Read-modify-write of the settings row. Callers hold the write lock.
    async fn apply_settings(
        &self,
        change: impl FnOnce(&mut RuntimeSettings),
    ) -> Result<RuntimeSettings, ScrubberError> {
        let mut settings = self.inner.ports.settings.load().await?;
        change(&mut settings);
        self.inner.ports.settings.save(&settings).await?;
        Ok(settings)
    }
}
