// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of Bot API failures onto [`ActionError`].

use scrubber_core::ActionError;
use teloxide::{ApiError, RequestError};

/// Bot API descriptions that mean the target message no longer exists.
const NOT_FOUND_MARKERS: &[&str] = &[
    "message to delete not found",
    "message to copy not found",
    "message to forward not found",
    "message_id_invalid",
    "message not found",
];

/// Classifies a failed Bot API request.
///
/// Network trouble and flood control are retried on the next cycle; an
/// explicit "not found" is reported separately so callers can treat a
/// repeated delete as success. Everything else is fatal for the item.
pub fn classify(err: &RequestError) -> ActionError {
    match err {
        RequestError::Api(api) => classify_api(api),
        RequestError::RetryAfter(after) => {
            ActionError::Transient(format!("flood control, retry after {after:?}"))
        }
        RequestError::Network(_) | RequestError::Io(_) => ActionError::Transient(err.to_string()),
        _ => ActionError::Fatal(err.to_string()),
    }
}

fn classify_api(api: &ApiError) -> ActionError {
    if matches!(api, ApiError::MessageToDeleteNotFound) {
        return ActionError::NotFound(api.to_string());
    }
    let text = api.to_string();
    let lower = text.to_ascii_lowercase();
    if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        return ActionError::NotFound(text);
    }
    if lower.contains("too many requests") || lower.contains("internal server error") {
        return ActionError::Transient(text);
    }
    ActionError::Fatal(text)
}
