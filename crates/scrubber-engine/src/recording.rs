// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; nothing is exported unless the binary
//! installs a recorder.

use metrics::{describe_counter, describe_gauge};

/// Register all lifecycle metric descriptions.
pub fn register_metrics() {
    describe_counter!("scrubber_tracked_total", "Messages accepted for tracking");
    describe_counter!("scrubber_ignored_total", "Inbound messages not tracked");
    describe_counter!("scrubber_reposts_total", "Successful repost cycles");
    describe_counter!("scrubber_expired_total", "Items removed at their deadline");
    describe_counter!("scrubber_failures_total", "Failed platform actions");
    describe_counter!("scrubber_recovered_total", "Items resumed at startup");
    describe_gauge!("scrubber_active_units", "Running execution units");
}

pub(crate) fn record_tracked() {
    metrics::counter!("scrubber_tracked_total").increment(1);
}

pub(crate) fn record_ignored(reason: &'static str) {
    metrics::counter!("scrubber_ignored_total", "reason" => reason).increment(1);
}

pub(crate) fn record_repost() {
    metrics::counter!("scrubber_reposts_total").increment(1);
}

pub(crate) fn record_expired() {
    metrics::counter!("scrubber_expired_total").increment(1);
}

pub(crate) fn record_failure(action: &'static str, kind: &'static str) {
    metrics::counter!("scrubber_failures_total", "action" => action, "kind" => kind).increment(1);
}

pub(crate) fn record_recovered(count: usize) {
    metrics::counter!("scrubber_recovered_total").increment(count as u64);
}

pub(crate) fn set_active_units(count: usize) {
    metrics::gauge!("scrubber_active_units").set(count as f64);
}
