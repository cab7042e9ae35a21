// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle engine behaviour under tokio's paused clock.
//!
//! Every test runs with `start_paused = true`: sleeps in the test body and in
//! execution units advance the same virtual clock, so "at t = N" below means
//! exactly N seconds after the harness was built.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use scrubber_core::types::{AdapterType, ChatId, HealthStatus, InboundContent, MessageId, UserId};
use scrubber_core::{
    ActionError, ContentActionPort, LoopStore, PluginAdapter, ScrubberError, SettingsStore,
};
use scrubber_engine::{EnginePorts, LifecycleEngine, SettingLimits};
use scrubber_storage::MemoryStorage;
use scrubber_test_utils::{MOCK_BOT_ID, MockContentPort, PausedClock, TestHarness};

const CHAT: ChatId = ChatId(-1001);

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test(start_paused = true)]
async fn reposts_once_then_expires_at_deadline() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(10)
        .build()
        .await
        .unwrap();

    let item = h.receive(CHAT).await.unwrap().expect("tracked");
    let original = item.current_message_id;

    // t = 6: one repost, row moved to the copy, deadline unchanged.
    sleep(secs(6)).await;
    let copies = h.port.copies().await;
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].source, original);
    let row = h.loops.get(&item.id).await.unwrap().expect("row still live");
    assert_eq!(row.current_message_id, copies[0].copy);
    assert_eq!(row.expiration_time, item.expiration_time);
    assert_eq!(h.port.visible(CHAT).await, vec![copies[0].copy]);

    // t = 11: the wake at t = 10 expired the item instead of reposting.
    sleep(secs(5)).await;
    assert_eq!(h.port.copies().await.len(), 1, "no repost after expiry");
    assert!(h.loops.get(&item.id).await.unwrap().is_none());
    assert!(h.port.visible(CHAT).await.is_empty());
    assert_eq!(h.engine.active_units(), 0);
}

#[tokio::test(start_paused = true)]
async fn reposts_every_cycle_until_expiry() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(20)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();

    sleep(secs(16)).await;
    assert_eq!(h.port.copies().await.len(), 3, "reposts at t = 5, 10, 15");
    assert_eq!(h.port.visible(CHAT).await.len(), 1, "exactly one visible copy");

    sleep(secs(5)).await;
    assert_eq!(h.port.copies().await.len(), 3);
    assert!(h.current_message(&item).await.is_none());
    assert!(h.port.visible(CHAT).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn expiry_takes_precedence_over_repost() {
    let h = TestHarness::builder()
        .with_delay(10)
        .with_loop_duration(10)
        .build()
        .await
        .unwrap();
    h.receive(CHAT).await.unwrap().unwrap();

    sleep(secs(11)).await;
    assert!(h.port.copies().await.is_empty());
    assert_eq!(h.loops.count().await.unwrap(), 0);
    assert!(h.port.visible(CHAT).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleting_an_already_deleted_message_counts_as_success() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(5)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port.remove_externally(CHAT, item.current_message_id).await;

    sleep(secs(30)).await;
    assert_eq!(h.port.delete_calls().await, vec![(CHAT, item.current_message_id)]);
    assert_eq!(h.loops.count().await.unwrap(), 0);
    assert_eq!(h.engine.active_units(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_source_retires_item_without_retrying() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port.remove_externally(CHAT, item.current_message_id).await;

    sleep(secs(60)).await;
    assert!(h.port.copies().await.is_empty());
    assert!(h.loops.get(&item.id).await.unwrap().is_none());
    assert_eq!(h.engine.active_units(), 0);
}

#[tokio::test(start_paused = true)]
async fn fatal_copy_failure_retires_item() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port
        .fail_next_copy(ActionError::Fatal("bot lacks rights".into()))
        .await;

    sleep(secs(6)).await;
    assert!(h.loops.get(&item.id).await.unwrap().is_none());
    assert!(
        h.port.is_visible(CHAT, item.current_message_id).await,
        "a failed item leaves the original alone"
    );
}

#[tokio::test(start_paused = true)]
async fn transient_copy_failure_retries_next_cycle() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port
        .fail_next_copy(ActionError::Transient("Too Many Requests".into()))
        .await;

    sleep(secs(6)).await;
    assert!(h.port.copies().await.is_empty());
    assert_eq!(h.current_message(&item).await, Some(item.current_message_id));

    sleep(secs(5)).await;
    let copies = h.port.copies().await;
    assert_eq!(copies.len(), 1, "exactly one retry, on the next cycle");
    assert_eq!(h.current_message(&item).await, Some(copies[0].copy));
}

#[tokio::test(start_paused = true)]
async fn transient_failure_deleting_expired_message_retries() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(5)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port
        .fail_next_delete(ActionError::Transient("timeout".into()))
        .await;

    sleep(secs(6)).await;
    assert!(h.loops.get(&item.id).await.unwrap().is_some());
    assert!(h.port.is_visible(CHAT, item.current_message_id).await);

    sleep(secs(5)).await;
    assert!(h.loops.get(&item.id).await.unwrap().is_none());
    assert!(!h.port.is_visible(CHAT, item.current_message_id).await);
    assert!(h.port.copies().await.is_empty(), "expired items are never reposted");
}

#[tokio::test(start_paused = true)]
async fn failure_to_delete_original_keeps_looping() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    h.port
        .fail_next_delete(ActionError::Fatal("message can't be deleted".into()))
        .await;

    sleep(secs(11)).await;
    assert_eq!(h.port.copies().await.len(), 2);
    assert!(h.current_message(&item).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn delay_change_applies_from_next_sleep() {
    let h = TestHarness::builder()
        .with_delay(30)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    h.receive(CHAT).await.unwrap().unwrap();
    h.receive(CHAT).await.unwrap().unwrap();

    sleep(secs(10)).await;
    h.engine.set_delay(5).await.unwrap();

    // In-flight 30 s sleeps are not shortened.
    sleep(secs(19)).await;
    assert!(h.port.copies().await.is_empty());

    // t = 31: both reposted once; t = 36: both again on the new 5 s cadence.
    sleep(secs(2)).await;
    assert_eq!(h.port.copies().await.len(), 2);
    sleep(secs(5)).await;
    assert_eq!(h.port.copies().await.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn removed_row_stops_unit_within_one_window() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();

    sleep(secs(2)).await;
    assert!(h.loops.delete(&item.id).await.unwrap());

    sleep(secs(4)).await;
    assert_eq!(h.engine.active_units(), 0);
    assert!(h.port.copies().await.is_empty());
    assert!(h.port.delete_calls().await.is_empty());
    assert!(h.port.is_visible(CHAT, item.current_message_id).await);
}

#[tokio::test(start_paused = true)]
async fn stop_all_cancels_every_item_and_disables_ingestion() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    for _ in 0..3 {
        h.receive(CHAT).await.unwrap().unwrap();
    }

    assert_eq!(h.engine.stop_all().await.unwrap(), 3);
    sleep(secs(6)).await;
    assert_eq!(h.engine.active_units(), 0);
    assert!(h.port.copies().await.is_empty());

    assert!(h.receive(CHAT).await.unwrap().is_none());
    let status = h.engine.status().await.unwrap();
    assert_eq!(status.active_count, 0);
    assert!(!status.ingestion_enabled);
}

#[tokio::test(start_paused = true)]
async fn disabled_ingestion_ignores_new_messages_until_started() {
    let h = TestHarness::builder()
        .ingestion_disabled()
        .build()
        .await
        .unwrap();

    assert!(h.receive(CHAT).await.unwrap().is_none());
    assert_eq!(h.loops.count().await.unwrap(), 0);

    let settings = h.engine.start_tracking().await.unwrap();
    assert!(settings.ingestion_enabled);
    assert!(h.receive(CHAT).await.unwrap().is_some());
    assert_eq!(h.engine.status().await.unwrap().active_count, 1);
}

#[tokio::test(start_paused = true)]
async fn own_messages_are_never_tracked() {
    let h = TestHarness::builder().build().await.unwrap();

    assert!(h.receive_from(CHAT, Some(MOCK_BOT_ID)).await.unwrap().is_none());
    assert_eq!(h.loops.count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn anonymous_copy_of_our_own_repost_is_ignored() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    sleep(secs(6)).await;
    let copy = h.current_message(&item).await.unwrap();

    let echoed = h
        .engine
        .track_new(&InboundContent {
            chat_id: CHAT,
            message_id: copy,
            origin: None,
        })
        .await
        .unwrap();
    assert!(echoed.is_none());
    assert_eq!(h.loops.count().await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_loop_duration_reposts_once_and_keeps_copy() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(0)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    assert!(item.fire_once);

    sleep(secs(6)).await;
    let copies = h.port.copies().await;
    assert_eq!(copies.len(), 1);
    assert_eq!(h.loops.count().await.unwrap(), 0);
    assert_eq!(h.port.visible(CHAT).await, vec![copies[0].copy]);

    sleep(secs(60)).await;
    assert_eq!(h.port.copies().await.len(), 1);
    assert_eq!(h.port.visible(CHAT).await, vec![copies[0].copy]);
}

#[tokio::test(start_paused = true)]
async fn duration_change_does_not_touch_existing_items() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let before = h.receive(CHAT).await.unwrap().unwrap();
    h.engine.set_loop_duration(0).await.unwrap();
    let after = h.receive(CHAT).await.unwrap().unwrap();

    assert!(!before.fire_once);
    assert!(after.fire_once);

    sleep(secs(11)).await;
    assert!(h.loops.get(&before.id).await.unwrap().is_some());
    assert!(h.loops.get(&after.id).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn setting_changes_respect_limits() {
    let h = TestHarness::builder()
        .with_limits(SettingLimits {
            min_delay_secs: 5,
            max_delay_secs: 300,
            max_loop_duration_secs: Some(86_400),
        })
        .build()
        .await
        .unwrap();

    assert!(matches!(
        h.engine.set_delay(4).await,
        Err(ScrubberError::InvalidSetting(_))
    ));
    assert!(matches!(
        h.engine.set_delay(301).await,
        Err(ScrubberError::InvalidSetting(_))
    ));
    assert!(matches!(
        h.engine.set_loop_duration(86_401).await,
        Err(ScrubberError::InvalidSetting(_))
    ));

    assert_eq!(h.engine.set_delay(300).await.unwrap().repost_delay_seconds, 300);
    assert_eq!(h.settings.load().await.unwrap().repost_delay_seconds, 300);
    let status = h.engine.status().await.unwrap();
    assert_eq!(status.repost_delay_seconds, 300);
}

#[tokio::test(start_paused = true)]
async fn recovery_attaches_one_unit_per_row() {
    let mut h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let mut items = Vec::new();
    for _ in 0..3 {
        items.push(h.receive(CHAT).await.unwrap().unwrap());
    }

    let engine = h.restart().await;
    assert_eq!(engine.active_units(), 0);
    assert_eq!(h.loops.count().await.unwrap(), 3, "shutdown leaves rows in place");

    assert_eq!(engine.recover().await.unwrap(), 3);
    assert_eq!(engine.active_units(), 3);
    assert_eq!(engine.recover().await.unwrap(), 0, "recovery runs once");

    sleep(secs(6)).await;
    let copies = h.port.copies().await;
    assert_eq!(copies.len(), 3, "one repost per row, no duplicates");
    let sources: HashSet<MessageId> = copies.iter().map(|c| c.source).collect();
    let originals: HashSet<MessageId> = items.iter().map(|i| i.current_message_id).collect();
    assert_eq!(sources, originals);
}

#[tokio::test(start_paused = true)]
async fn recovered_item_past_deadline_expires_on_first_wake() {
    let mut h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(10)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();
    let engine = h.restart().await;

    // Process "down" well past the deadline.
    sleep(secs(30)).await;
    assert_eq!(engine.recover().await.unwrap(), 1);
    sleep(secs(6)).await;

    assert!(h.port.copies().await.is_empty());
    assert!(h.loops.get(&item.id).await.unwrap().is_none());
    assert!(!h.port.is_visible(CHAT, item.current_message_id).await);
}

#[tokio::test(start_paused = true)]
async fn recovery_skips_items_with_running_units() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    h.receive(CHAT).await.unwrap().unwrap();

    assert_eq!(h.engine.recover().await.unwrap(), 0);
    assert_eq!(h.engine.active_units(), 1);

    sleep(secs(6)).await;
    assert_eq!(h.port.copies().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_leaves_rows_for_next_start() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(3600)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();

    h.shutdown().await;
    sleep(secs(20)).await;

    assert_eq!(h.engine.active_units(), 0);
    assert!(h.port.copies().await.is_empty());
    assert_eq!(h.current_message(&item).await, Some(item.current_message_id));
    assert!(h.receive(CHAT).await.unwrap().is_some(), "rows can still be written");
    assert_eq!(h.engine.active_units(), 0, "no new units after shutdown");
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn expiry_is_logged_with_item_context() {
    let h = TestHarness::builder()
        .with_delay(5)
        .with_loop_duration(5)
        .build()
        .await
        .unwrap();
    let item = h.receive(CHAT).await.unwrap().unwrap();

    sleep(secs(6)).await;
    assert!(logs_contain("item expired"));
    assert!(logs_contain(item.id.as_str()));
}

/// A port that deletes the item's row while the copy is in flight, the way a
/// concurrent `/stopscrub` would.
struct RacingPort {
    inner: MockContentPort,
    loops: Arc<MemoryStorage>,
}

#[async_trait]
impl PluginAdapter for RacingPort {
    fn name(&self) -> &str {
        "racing"
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
impl ContentActionPort for RacingPort {
    async fn service_identity(&self) -> Result<UserId, ActionError> {
        self.inner.service_identity().await
    }

    async fn copy_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, ActionError> {
        let copy = self.inner.copy_message(chat_id, message_id).await?;
        self.loops
            .delete_all()
            .await
            .map_err(|e| ActionError::Fatal(e.to_string()))?;
        Ok(copy)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), ActionError> {
        self.inner.delete_message(chat_id, message_id).await
    }

    async fn list_administrators(&self, chat_id: ChatId) -> Result<HashSet<UserId>, ActionError> {
        self.inner.list_administrators(chat_id).await
    }
}

#[tokio::test(start_paused = true)]
async fn copy_made_after_cancellation_is_discarded() {
    let store = Arc::new(MemoryStorage::new(scrubber_core::RuntimeSettings {
        repost_delay_seconds: 5,
        loop_duration_seconds: 3600,
        ingestion_enabled: true,
    }));
    let mock = MockContentPort::new();
    let engine = LifecycleEngine::new(
        EnginePorts {
            loops: store.clone(),
            settings: store.clone(),
            content: Arc::new(RacingPort {
                inner: mock.clone(),
                loops: store.clone(),
            }),
            clock: Arc::new(PausedClock::default()),
        },
        SettingLimits::default(),
        CancellationToken::new(),
    );

    let original = mock.post(CHAT).await;
    engine
        .track_new(&InboundContent {
            chat_id: CHAT,
            message_id: original,
            origin: Some(UserId(1)),
        })
        .await
        .unwrap()
        .unwrap();

    sleep(secs(6)).await;
    let copies = mock.copies().await;
    assert_eq!(copies.len(), 1);
    assert!(!mock.is_visible(CHAT, copies[0].copy).await, "orphan copy removed");
    assert!(mock.is_visible(CHAT, original).await, "cancelled item keeps original");
    assert_eq!(engine.active_units(), 0);
}

/// Settings store whose first `load` stalls, widening the window between
/// the ingestion check and the insert in `track_new`.
struct StallingSettings {
    inner: Arc<MemoryStorage>,
    stalled: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl SettingsStore for StallingSettings {
    async fn load(&self) -> Result<scrubber_core::RuntimeSettings, ScrubberError> {
        if !self.stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
            sleep(Duration::from_millis(10)).await;
        }
        self.inner.load().await
    }

    async fn save(&self, settings: &scrubber_core::RuntimeSettings) -> Result<(), ScrubberError> {
        self.inner.save(settings).await
    }
}

#[tokio::test(start_paused = true)]
async fn stop_racing_a_new_message_leaves_no_row_behind() {
    let store = Arc::new(MemoryStorage::new(scrubber_core::RuntimeSettings {
        repost_delay_seconds: 5,
        loop_duration_seconds: 3600,
        ingestion_enabled: true,
    }));
    let mock = MockContentPort::new();
    let engine = LifecycleEngine::new(
        EnginePorts {
            loops: store.clone(),
            settings: Arc::new(StallingSettings {
                inner: store.clone(),
                stalled: std::sync::atomic::AtomicBool::new(false),
            }),
            content: Arc::new(mock.clone()),
            clock: Arc::new(PausedClock::default()),
        },
        SettingLimits::default(),
        CancellationToken::new(),
    );

    let original = mock.post(CHAT).await;
    let event = InboundContent {
        chat_id: CHAT,
        message_id: original,
        origin: Some(UserId(1)),
    };
    let (tracked, stopped) = tokio::join!(engine.track_new(&event), engine.stop_all());
    let tracked = tracked.unwrap();
    let stopped = stopped.unwrap();

    assert_eq!(store.count().await.unwrap(), 0, "stop removed every row");
    assert_eq!(stopped, usize::from(tracked.is_some()));
    assert!(!store.load().await.unwrap().ingestion_enabled);

    sleep(secs(6)).await;
    assert!(mock.copies().await.is_empty());
    assert!(mock.is_visible(CHAT, original).await);
    assert_eq!(engine.active_units(), 0);
}
