// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Scrubber bot.
//!
//! This crate provides the port traits, error types, and data model shared
//! by the lifecycle engine and its adapters. The engine depends only on the
//! traits defined here; storage and platform crates implement them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ActionError, ScrubberError};
pub use types::{
    AdapterType, ChatId, EngineStatus, HealthStatus, InboundContent, LoopId, LoopItem, MessageId,
    RuntimeSettings, UserId,
};

pub use traits::{
    Clock, ContentActionPort, LoopStore, PluginAdapter, SettingsStore, StorageAdapter,
    SystemClock,
};
