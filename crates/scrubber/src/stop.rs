// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scrubber stop` command implementation.
//!
//! Same effect as `/stopscrub` from an admin: ingestion is switched off and
//! every row is deleted. A running bot's units see their rows gone on the
//! next wake and exit without touching the chat.

use scrubber_config::model::ScrubberConfig;
use scrubber_core::{LoopStore, ScrubberError, SettingsStore, StorageAdapter};

use crate::serve::{database_exists, open_database};

async fn stop_all(config: &ScrubberConfig) -> Result<Option<usize>, ScrubberError> {
    if !database_exists(config) {
        return Ok(None);
    }

    let storage = open_database(config).await?;
    let mut settings = storage.load().await?;
    settings.ingestion_enabled = false;
    storage.save(&settings).await?;
    let removed = storage.delete_all().await?;
    storage.close().await?;
    Ok(Some(removed))
}

/// Run the `scrubber stop` command.
pub async fn run_stop(config: &ScrubberConfig) -> Result<(), ScrubberError> {
    match stop_all(config).await? {
        Some(removed) => {
            println!("scrubber: ingestion disabled, {removed} tracked message(s) cancelled")
        }
        None => println!(
            "scrubber: no database at {}, nothing to stop",
            config.storage.database_path
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use scrubber_core::types::{ChatId, LoopItem, MessageId};

    fn item(message: i32) -> LoopItem {
        LoopItem::new(
            ChatId(-1),
            MessageId(message),
            chrono::Utc::now(),
            std::time::Duration::from_secs(3600),
        )
    }

    fn config_in(dir: &tempfile::TempDir) -> ScrubberConfig {
        let mut config = ScrubberConfig::default();
        config.storage.database_path = dir.path().join("scrubber.db").display().to_string();
        config.lifecycle.start_enabled = true;
        config
    }

    #[tokio::test]
    async fn stop_without_database_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        assert_eq!(stop_all(&config).await.unwrap(), None);
        assert!(!database_exists(&config));
    }

    #[tokio::test]
    async fn stop_clears_rows_and_disables_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let storage = open_database(&config).await.unwrap();
        storage.insert(&item(1)).await.unwrap();
        storage.insert(&item(2)).await.unwrap();
        storage.close().await.unwrap();

        assert_eq!(stop_all(&config).await.unwrap(), Some(2));

        let storage = open_database(&config).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 0);
        assert!(!storage.load().await.unwrap().ingestion_enabled);
    }
}
