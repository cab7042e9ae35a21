// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A wall clock driven by tokio's (pausable) timer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::time::Instant;

use scrubber_core::Clock;

/// Wall-clock time that advances only with tokio's timer.
///
/// Under `#[tokio::test(start_paused = true)]` both `now()` and `sleep()`
/// follow the paused clock, so deadlines computed from `now()` line up
/// exactly with timers.
#[derive(Debug, Clone, Copy)]
pub struct PausedClock {
    anchor_wall: DateTime<Utc>,
    anchor_instant: Instant,
}

impl PausedClock {
    /// Anchors wall time `at` to the current tokio instant.
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self {
            anchor_wall: at,
            anchor_instant: Instant::now(),
        }
    }

    /// Time elapsed on the tokio clock since construction.
    pub fn elapsed(&self) -> Duration {
        self.anchor_instant.elapsed()
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        let epoch = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(epoch)
    }
}

#[async_trait]
impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.anchor_instant.elapsed())
            .unwrap_or(chrono::Duration::MAX);
        self.anchor_wall + elapsed
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn now_tracks_paused_timer() {
        let clock = PausedClock::default();
        let start = clock.now();
        clock.sleep(Duration::from_secs(30)).await;
        assert_eq!(clock.now() - start, chrono::Duration::seconds(30));
        assert_eq!(clock.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn advance_moves_wall_time() {
        let clock = PausedClock::default();
        let start = clock.now();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(clock.now() - start, chrono::Duration::milliseconds(1500));
    }
}
