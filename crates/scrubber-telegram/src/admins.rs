// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat administrator cache backing the command gate.

use std::collections::HashSet;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use scrubber_core::types::{ChatId, UserId};
use scrubber_core::{ActionError, ContentActionPort};

struct Entry {
    fetched_at: Instant,
    admins: HashSet<UserId>,
}

/// Caches each chat's administrator list for a fixed time-to-live.
pub struct AdminCache {
    ttl: Duration,
    chats: DashMap<ChatId, Entry>,
}

impl AdminCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            chats: DashMap::new(),
        }
    }

    /// Whether `user` may run admin commands in `chat_id`.
    ///
    /// Private chats are always allowed. Groups consult the cached list,
    /// refreshing it through `port` once it is older than the TTL.
    pub async fn is_admin(
        &self,
        port: &dyn ContentActionPort,
        chat_id: ChatId,
        user: UserId,
        private: bool,
    ) -> Result<bool, ActionError> {
        if private {
            return Ok(true);
        }

        if let Some(entry) = self.chats.get(&chat_id) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.admins.contains(&user));
            }
        }

        debug!(chat_id = %chat_id, "fetching chat administrators");
        let admins = port.list_administrators(chat_id).await?;
        let allowed = admins.contains(&user);
        self.chats.insert(
            chat_id,
            Entry {
                fetched_at: Instant::now(),
                admins,
            },
        );
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubber_test_utils::MockContentPort;

    const GROUP: ChatId = ChatId(-500);
    const ADMIN: UserId = UserId(1);
    const MEMBER: UserId = UserId(2);

    #[tokio::test(start_paused = true)]
    async fn private_chats_skip_the_lookup() {
        let port = MockContentPort::new();
        let cache = AdminCache::new(Duration::from_secs(600));
        assert!(cache.is_admin(&port, ChatId(9), MEMBER, true).await.unwrap());
        assert_eq!(port.admin_lookups().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn list_is_cached_until_ttl() {
        let port = MockContentPort::new();
        port.set_admins(GROUP, [ADMIN]).await;
        let cache = AdminCache::new(Duration::from_secs(600));

        assert!(cache.is_admin(&port, GROUP, ADMIN, false).await.unwrap());
        assert!(!cache.is_admin(&port, GROUP, MEMBER, false).await.unwrap());
        assert_eq!(port.admin_lookups().await, 1);

        port.set_admins(GROUP, [ADMIN, MEMBER]).await;
        tokio::time::sleep(Duration::from_secs(599)).await;
        assert!(!cache.is_admin(&port, GROUP, MEMBER, false).await.unwrap());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.is_admin(&port, GROUP, MEMBER, false).await.unwrap());
        assert_eq!(port.admin_lookups().await, 2);
    }
}
