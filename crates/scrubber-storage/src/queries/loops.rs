// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations on the `loop_items` table.
//!
//! Each function is a single statement, so every row change is atomic.
//! Updates and deletes report whether a row was actually touched; callers
//! racing a bulk stop observe `false` instead of recreating the row.

use rusqlite::{OptionalExtension, Row, params};
use scrubber_core::types::{ChatId, LoopId, LoopItem, MessageId};
use scrubber_core::ScrubberError;

use super::{format_ts, parse_ts};
use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, chat_id, current_message_id, expiration_time, fire_once, created_at";

fn row_to_item(row: &Row<'_>) -> Result<LoopItem, rusqlite::Error> {
    let expiration: String = row.get(3)?;
    let created: String = row.get(5)?;
    Ok(LoopItem {
        id: LoopId(row.get(0)?),
        chat_id: ChatId(row.get(1)?),
        current_message_id: MessageId(row.get(2)?),
        expiration_time: parse_ts(3, &expiration)?,
        fire_once: row.get(4)?,
        created_at: parse_ts(5, &created)?,
    })
}

pub async fn insert(db: &Database, item: &LoopItem) -> Result<LoopId, ScrubberError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| -> Result<LoopId, rusqlite::Error> {
            conn.execute(
                "INSERT INTO loop_items (id, chat_id, current_message_id, expiration_time, fire_once, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.id.as_str(),
                    item.chat_id.0,
                    item.current_message_id.0,
                    format_ts(item.expiration_time),
                    item.fire_once,
                    format_ts(item.created_at),
                ],
            )?;
            Ok(item.id)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &LoopId) -> Result<Option<LoopItem>, ScrubberError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<Option<LoopItem>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM loop_items WHERE id = ?1"),
                params![id.as_str()],
                row_to_item,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Points the row at its fresh copy. Returns `false` if the row is gone.
pub async fn update_message_id(
    db: &Database,
    id: &LoopId,
    new_message_id: MessageId,
) -> Result<bool, ScrubberError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE loop_items SET current_message_id = ?2 WHERE id = ?1",
                params![id.as_str(), new_message_id.0],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete(db: &Database, id: &LoopId) -> Result<bool, ScrubberError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed =
                conn.execute("DELETE FROM loop_items WHERE id = ?1", params![id.as_str()])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All rows, oldest first.
pub async fn list_all(db: &Database) -> Result<Vec<LoopItem>, ScrubberError> {
    db.connection()
        .call(|conn| -> Result<Vec<LoopItem>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM loop_items ORDER BY created_at ASC, id ASC"
            ))?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_all(db: &Database) -> Result<usize, ScrubberError> {
    db.connection()
        .call(|conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM loop_items", [])
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count(db: &Database) -> Result<usize, ScrubberError> {
    db.connection()
        .call(|conn| -> Result<usize, rusqlite::Error> {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM loop_items", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn tracks_message(
    db: &Database,
    chat_id: ChatId,
    message_id: MessageId,
) -> Result<bool, ScrubberError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM loop_items WHERE chat_id = ?1 AND current_message_id = ?2)",
                params![chat_id.0, message_id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
