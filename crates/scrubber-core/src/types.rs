// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the engine, storage and channel crates.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a conversation on the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Identifier of a single message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

/// Identifier of a platform user (including the bot itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Opaque, stable identifier of a tracked [`LoopItem`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopId(pub String);

impl LoopId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        LoopId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted record tracking one piece of content through its
/// repost/delete lifecycle.
///
/// `id` never changes; `current_message_id` moves to the fresh copy on every
/// repost cycle. A missing row is the terminal state: there is no "stopped"
/// flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopItem {
    pub id: LoopId,
    pub chat_id: ChatId,
    pub current_message_id: MessageId,
    pub expiration_time: DateTime<Utc>,
    /// Single copy-then-delete pass with no expiry and no re-arming.
    /// Fixed at creation from a zero loop duration.
    pub fire_once: bool,
    pub created_at: DateTime<Utc>,
}

impl LoopItem {
    /// Builds a new item whose deadline is `now + loop_duration`.
    ///
    /// A zero `loop_duration` produces a fire-once item.
    pub fn new(
        chat_id: ChatId,
        message_id: MessageId,
        now: DateTime<Utc>,
        loop_duration: Duration,
    ) -> Self {
        let span = chrono::Duration::from_std(loop_duration).unwrap_or(chrono::Duration::MAX);
        let expiration_time = now.checked_add_signed(span).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id: LoopId::generate(),
            chat_id,
            current_message_id: message_id,
            expiration_time,
            fire_once: loop_duration.is_zero(),
            created_at: now,
        }
    }

    /// Whether the deadline has passed at `now`. Fire-once items never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.fire_once && now >= self.expiration_time
    }
}

/// Process-wide settings that the command layer mutates at runtime.
///
/// Read fresh on every scheduling decision so a change reaches all active
/// items on their next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub repost_delay_seconds: u64,
    pub loop_duration_seconds: u64,
    /// Gates new tracking only. Execution units never consult it.
    pub ingestion_enabled: bool,
}

impl RuntimeSettings {
    pub fn repost_delay(&self) -> Duration {
        Duration::from_secs(self.repost_delay_seconds)
    }

    pub fn loop_duration(&self) -> Duration {
        Duration::from_secs(self.loop_duration_seconds)
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            repost_delay_seconds: 30,
            loop_duration_seconds: 12 * 60 * 60,
            ingestion_enabled: false,
        }
    }
}

/// An inbound content event, already stripped of platform detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundContent {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Sender of the message; `None` for anonymous admins and channel posts.
    pub origin: Option<UserId>,
}

/// Snapshot reported by the `/status` command and `scrubber status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub active_count: usize,
    pub ingestion_enabled: bool,
    pub repost_delay_seconds: u64,
    pub loop_duration_seconds: u64,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_item_expires_after_loop_duration() {
        let item = LoopItem::new(ChatId(-100), MessageId(7), t0(), Duration::from_secs(10));
        assert_eq!(item.expiration_time, t0() + chrono::Duration::seconds(10));
        assert!(!item.fire_once);
        assert!(!item.is_expired(t0() + chrono::Duration::seconds(9)));
        assert!(item.is_expired(t0() + chrono::Duration::seconds(10)));
    }

    #[test]
    fn zero_duration_is_fire_once_and_never_expires() {
        let item = LoopItem::new(ChatId(-100), MessageId(7), t0(), Duration::ZERO);
        assert!(item.fire_once);
        assert!(!item.is_expired(t0() + chrono::Duration::days(365)));
    }

    #[test]
    fn huge_duration_saturates_instead_of_panicking() {
        let item = LoopItem::new(ChatId(1), MessageId(1), t0(), Duration::from_secs(u64::MAX));
        assert_eq!(item.expiration_time, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn generated_loop_ids_are_unique() {
        assert_ne!(LoopId::generate(), LoopId::generate());
    }

    #[test]
    fn default_settings_match_original_bot() {
        let settings = RuntimeSettings::default();
        assert_eq!(settings.repost_delay(), Duration::from_secs(30));
        assert_eq!(settings.loop_duration(), Duration::from_secs(43_200));
        assert!(!settings.ingestion_enabled);
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;
        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let parsed = AdapterType::from_str(&variant.to_string()).unwrap();
            assert_eq!(parsed, variant);
        }
    }
}
