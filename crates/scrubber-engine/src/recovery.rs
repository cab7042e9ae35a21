// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup recovery: resume every persisted item.

use std::sync::atomic::Ordering;

use tracing::{info, warn};

use scrubber_core::ScrubberError;

use crate::engine::LifecycleEngine;
use crate::recording;

impl LifecycleEngine {
    /// Attaches one execution unit to every row in the Loop Store.
    ///
    /// Runs once per engine; later calls return `Ok(0)`. Must be called
    /// before ingestion starts. Each resumed unit sleeps first and then
    /// re-reads its row, so an item whose deadline passed while the process
    /// was down expires on its first wake.
    pub async fn recover(&self) -> Result<usize, ScrubberError> {
        if self.inner.recovered.swap(true, Ordering::SeqCst) {
            warn!("recovery already ran for this engine, skipping");
            return Ok(0);
        }

        let items = match self.inner.ports.loops.list_all().await {
            Ok(items) => items,
            Err(e) => {
                self.inner.recovered.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let attached = items
            .iter()
            .filter(|item| self.spawn_unit(item.id.clone()))
            .count();
        recording::record_recovered(attached);
        info!(found = items.len(), attached, "recovered lifecycle items");
        Ok(attached)
    }
}
