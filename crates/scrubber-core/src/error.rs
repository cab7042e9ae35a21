// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Scrubber bot.

use thiserror::Error;

/// Outcome classification for a failed platform action.
///
/// The lifecycle engine branches on these three kinds only; the concrete
/// platform error is kept as text for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The target message no longer exists. Deleting it again is a no-op.
    #[error("target not found: {0}")]
    NotFound(String),

    /// Timeouts, rate limits and network failures. Safe to retry next cycle.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Permission revoked, malformed request, anything not worth retrying.
    #[error("fatal failure: {0}")]
    Fatal(String),
}

impl ActionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionError::NotFound(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ActionError::Transient(_))
    }
}

/// The primary error type used across Scrubber crates.
#[derive(Debug, Error)]
pub enum ScrubberError {
    /// Configuration errors (invalid TOML, missing bot token, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, dispatcher setup).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A platform action (copy, delete, admin lookup) failed.
    #[error("action failed: {0}")]
    Action(#[from] ActionError),

    /// A runtime setting was rejected (e.g. delay out of bounds).
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScrubberError {
    /// Wraps any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScrubberError::Storage {
            source: Box::new(err),
        }
    }
}
