// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Scrubber integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without the chat platform.
//!
//! # Components
//!
//! - [`MockContentPort`] - scriptable in-memory chat with copy/delete semantics
//! - [`PausedClock`] - wall clock that follows tokio's paused timer
//! - [`TestHarness`] - engine + mocks + storage, with simulated restarts

pub mod clock;
pub mod harness;
pub mod mock_content;

pub use clock::PausedClock;
pub use harness::{MEMBER, TestHarness, TestHarnessBuilder};
pub use mock_content::{CopyRecord, MOCK_BOT_ID, MockContentPort};
