// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Liveness HTTP endpoint for hosting platforms.
//!
//! Serves `GET /` and `GET /health`. Shares no state with the lifecycle
//! engine beyond the process start time.

pub mod handlers;
pub mod server;

pub use server::{HealthState, build_router, start_server};
