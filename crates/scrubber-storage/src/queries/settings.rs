// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-row `settings` table.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use scrubber_core::types::RuntimeSettings;
use scrubber_core::ScrubberError;

use super::format_ts;
use crate::database::{Database, map_tr_err};

pub async fn load(db: &Database) -> Result<Option<RuntimeSettings>, ScrubberError> {
    db.connection()
        .call(|conn| -> Result<Option<RuntimeSettings>, rusqlite::Error> {
            conn.query_row(
                "SELECT repost_delay_seconds, loop_duration_seconds, ingestion_enabled
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(RuntimeSettings {
                        repost_delay_seconds: row.get::<_, i64>(0)?.max(0) as u64,
                        loop_duration_seconds: row.get::<_, i64>(1)?.max(0) as u64,
                        ingestion_enabled: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts or replaces the settings row.
pub async fn save(db: &Database, settings: &RuntimeSettings) -> Result<(), ScrubberError> {
    let settings = *settings;
    let updated_at = format_ts(Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO settings (id, repost_delay_seconds, loop_duration_seconds, ingestion_enabled, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    repost_delay_seconds = excluded.repost_delay_seconds,
                    loop_duration_seconds = excluded.loop_duration_seconds,
                    ingestion_enabled = excluded.ingestion_enabled,
                    updated_at = excluded.updated_at",
                params![
                    clamp_i64(settings.repost_delay_seconds),
                    clamp_i64(settings.loop_duration_seconds),
                    settings.ingestion_enabled,
                    updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Writes `seed` only if no settings row exists yet. Returns whether it did.
pub async fn seed(db: &Database, seed: &RuntimeSettings) -> Result<bool, ScrubberError> {
    let seed = *seed;
    let updated_at = format_ts(Utc::now());
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO settings (id, repost_delay_seconds, loop_duration_seconds, ingestion_enabled, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4)",
                params![
                    clamp_i64(seed.repost_delay_seconds),
                    clamp_i64(seed.loop_duration_seconds),
                    seed.ingestion_enabled,
                    updated_at,
                ],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
