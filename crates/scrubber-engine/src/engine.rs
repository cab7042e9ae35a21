// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lifecycle engine handle and new-item ingestion.
//!
//! [`LifecycleEngine`] is a cheap, cloneable handle. Each tracked item gets
//! one execution unit (a tokio task, see [`crate::unit`]) bound to its id;
//! the engine keeps a registry of live ids so a second unit is never started
//! for the same item.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use dashmap::DashSet;
use tokio::sync::{OnceCell, RwLock};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use scrubber_core::types::{InboundContent, LoopId, LoopItem, UserId};
use scrubber_core::{
    ActionError, Clock, ContentActionPort, LoopStore, ScrubberError, SettingsStore,
};

use crate::control::SettingLimits;
use crate::recording;

/// The collaborators an engine is wired to.
#[derive(Clone)]
pub struct EnginePorts {
    pub loops: Arc<dyn LoopStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub content: Arc<dyn ContentActionPort>,
    pub clock: Arc<dyn Clock>,
}

pub(crate) struct EngineInner {
    pub(crate) ports: EnginePorts,
    pub(crate) limits: SettingLimits,
    pub(crate) live: DashSet<LoopId>,
    pub(crate) tracker: TaskTracker,
    pub(crate) shutdown: CancellationToken,
    pub(crate) identity: OnceCell<UserId>,
    pub(crate) recovered: AtomicBool,
    /// Held shared while an item is admitted, exclusively while settings
    /// change or everything is stopped.
    pub(crate) settings_lock: RwLock<()>,
}

/// Handle to the delayed-action lifecycle engine.
#[derive(Clone)]
pub struct LifecycleEngine {
    pub(crate) inner: Arc<EngineInner>,
}

/// Removes a unit's id from the live registry when the unit ends, however it ends.
struct LiveGuard<'a> {
    live: &'a DashSet<LoopId>,
    id: &'a LoopId,
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.live.remove(self.id);
        recording::set_active_units(self.live.len());
    }
}

impl LifecycleEngine {
    /// Creates an engine. Units stop when `shutdown` is cancelled.
    pub fn new(ports: EnginePorts, limits: SettingLimits, shutdown: CancellationToken) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                ports,
                limits,
                live: DashSet::new(),
                tracker: TaskTracker::new(),
                shutdown,
                identity: OnceCell::new(),
                recovered: AtomicBool::new(false),
                settings_lock: RwLock::new(()),
            }),
        }
    }

    /// Starts tracking a freshly received message.
    ///
    /// Returns `Ok(None)` when the message is ignored: it was posted by the
    /// service itself, or ingestion is disabled.
    pub async fn track_new(
        &self,
        event: &InboundContent,
    ) -> Result<Option<LoopItem>, ScrubberError> {
        if self.is_own_message(event).await? {
            debug!(
                chat_id = %event.chat_id,
                message_id = %event.message_id,
                "ignoring message posted by the service itself"
            );
            recording::record_ignored("self");
            return Ok(None);
        }

        // A stop cannot run between the ingestion check and the insert.
        let _admit = self.inner.settings_lock.read().await;
        let settings = self.inner.ports.settings.load().await?;
        if !settings.ingestion_enabled {
            recording::record_ignored("disabled");
            return Ok(None);
        }

        let item = LoopItem::new(
            event.chat_id,
            event.message_id,
            self.inner.ports.clock.now(),
            settings.loop_duration(),
        );
        self.inner.ports.loops.insert(&item).await?;
        recording::record_tracked();
        info!(
            loop_id = %item.id,
            chat_id = %item.chat_id,
            message_id = %item.current_message_id,
            expires_at = %item.expiration_time,
            fire_once = item.fire_once,
            "tracking new message"
        );

        self.spawn_unit(item.id.clone());
        Ok(Some(item))
    }

    /// Decides whether `event` is one of the service's own posts.
    ///
    /// The sender id compared against the service identity is authoritative.
    /// Only when either side is unknown does it fall back to asking the
    /// store whether the message is one of our current copies.
    async fn is_own_message(&self, event: &InboundContent) -> Result<bool, ScrubberError> {
        if let Some(origin) = event.origin {
            match self.service_identity().await {
                Ok(me) => return Ok(origin == me),
                Err(e) => warn!(error = %e, "service identity unavailable, using store lookup"),
            }
        }
        self.inner
            .ports
            .loops
            .tracks_message(event.chat_id, event.message_id)
            .await
    }

    /// The service's own user id, fetched once and cached.
    pub async fn service_identity(&self) -> Result<UserId, ActionError> {
        let content = &self.inner.ports.content;
        self.inner
            .identity
            .get_or_try_init(|| content.service_identity())
            .await
            .copied()
    }

    /// Starts the execution unit for `id` unless one is already running.
    ///
    /// Returns `false` when a unit for `id` is live or the engine is shutting down.
    pub(crate) fn spawn_unit(&self, id: LoopId) -> bool {
        if self.inner.shutdown.is_cancelled() {
            return false;
        }
        if !self.inner.live.insert(id.clone()) {
            debug!(loop_id = %id, "unit already running, not starting another");
            return false;
        }
        recording::set_active_units(self.inner.live.len());

        let engine = self.clone();
        self.inner.tracker.spawn(async move {
            let _guard = LiveGuard {
                live: &engine.inner.live,
                id: &id,
            };
            engine.run_unit(&id).await;
        });
        true
    }

    /// Number of execution units currently running in this process.
    pub fn active_units(&self) -> usize {
        self.inner.live.len()
    }

    /// Stops every unit and waits for them to finish. Rows are left intact.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        debug!("all execution units stopped");
    }
}
