// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delayed-action lifecycle engine for the Scrubber bot.
//!
//! Every tracked message gets an execution unit that, once per repost delay,
//! re-reads its persisted row and either reposts the content under the
//! service identity or, once the deadline passes, deletes it for good.
//! Rows are the only shared state: deleting a row cancels its unit.

pub mod control;
pub mod engine;
pub mod recording;
pub mod recovery;
pub mod shutdown;
mod unit;

pub use control::{SettingLimits, initial_settings};
pub use engine::{EnginePorts, LifecycleEngine};
pub use shutdown::install_signal_handler;
