// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scrubber serve` command implementation.
//!
//! Opens storage, resumes every persisted item through the recovery
//! bootstrapper, then starts Telegram long polling and the liveness server.
//! All of them stop on SIGINT/SIGTERM; rows are left in place so the next
//! start picks them up again.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use scrubber_config::model::ScrubberConfig;
use scrubber_core::types::RuntimeSettings;
use scrubber_core::{LoopStore, ScrubberError, SettingsStore, StorageAdapter, SystemClock};
use scrubber_engine::{
    EnginePorts, LifecycleEngine, SettingLimits, initial_settings, install_signal_handler,
};
use scrubber_storage::{MemoryStorage, SqliteStorage};
use scrubber_telegram::{AdminCache, TelegramContent, run_dispatcher};
use tracing::{error, info, warn};

#[cfg(feature = "gateway")]
use scrubber_gateway::{HealthState, start_server};

/// Opens the configured SQLite database, running migrations and seeding
/// the settings row on first use.
pub(crate) async fn open_database(config: &ScrubberConfig) -> Result<SqliteStorage, ScrubberError> {
    let storage = SqliteStorage::new(config.storage.clone(), initial_settings(&config.lifecycle));
    storage.initialize().await?;
    Ok(storage)
}

/// Whether a database file exists at the configured path.
pub(crate) fn database_exists(config: &ScrubberConfig) -> bool {
    Path::new(&config.storage.database_path).exists()
}

struct Stores {
    loops: Arc<dyn LoopStore>,
    settings: Arc<dyn SettingsStore>,
    sqlite: Option<Arc<SqliteStorage>>,
}

/// SQLite when it opens; in-memory only if storage is optional.
async fn open_stores(
    config: &ScrubberConfig,
    seed: RuntimeSettings,
) -> Result<Stores, ScrubberError> {
    match open_database(config).await {
        Ok(storage) => {
            let storage = Arc::new(storage);
            Ok(Stores {
                loops: storage.clone(),
                settings: storage.clone(),
                sqlite: Some(storage),
            })
        }
        Err(e) if !config.storage.required => {
            warn!(
                error = %e,
                path = %config.storage.database_path,
                "database unavailable, running in memory; tracked messages will not survive a restart"
            );
            let memory = Arc::new(MemoryStorage::new(seed));
            Ok(Stores {
                loops: memory.clone(),
                settings: memory,
                sqlite: None,
            })
        }
        Err(e) => {
            error!(error = %e, path = %config.storage.database_path, "failed to open database");
            Err(e)
        }
    }
}

/// Runs the `scrubber serve` command.
pub async fn run_serve(config: ScrubberConfig) -> Result<(), ScrubberError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting scrubber serve");

    let content = Arc::new(TelegramContent::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram adapter");
        eprintln!(
            "error: Telegram bot token required. Set via: TOKEN, SCRUBBER_TELEGRAM_BOT_TOKEN or telegram.bot_token in scrubber.toml"
        );
        e
    })?);

    let stores = open_stores(&config, initial_settings(&config.lifecycle)).await?;

    scrubber_engine::recording::register_metrics();
    scrubber_telegram::register_metrics();

    let cancel = install_signal_handler();

    let engine = LifecycleEngine::new(
        EnginePorts {
            loops: stores.loops.clone(),
            settings: stores.settings.clone(),
            content: content.clone(),
            clock: Arc::new(SystemClock),
        },
        SettingLimits::from(&config.lifecycle),
        cancel.clone(),
    );

    match engine.service_identity().await {
        Ok(id) => info!(bot_id = %id, "bot identity resolved"),
        Err(e) => warn!(
            error = %e,
            "could not resolve bot identity yet, self-check falls back to store lookups"
        ),
    }

    // Resume persisted items before any new update is accepted.
    let recovered = engine.recover().await?;
    let settings = stores.settings.load().await?;
    info!(
        recovered,
        ingestion_enabled = settings.ingestion_enabled,
        repost_delay_seconds = settings.repost_delay_seconds,
        loop_duration_seconds = settings.loop_duration_seconds,
        "recovery complete"
    );

    #[cfg(feature = "gateway")]
    let gateway = if config.gateway.enabled {
        let gateway_config = config.gateway.clone();
        let gateway_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            start_server(&gateway_config, HealthState::new(), gateway_cancel).await
        }))
    } else {
        info!("gateway disabled by configuration");
        None
    };

    let admins = Arc::new(AdminCache::new(Duration::from_secs(
        config.telegram.admin_cache_secs,
    )));
    run_dispatcher(content, engine.clone(), admins, cancel.clone()).await;

    // Polling also ends on unrecoverable API errors; stop everything else too.
    cancel.cancel();
    engine.shutdown().await;

    #[cfg(feature = "gateway")]
    {
        if let Some(handle) = gateway {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "gateway exited with error"),
                Err(e) => warn!(error = %e, "gateway task panicked"),
            }
        }
    }

    if let Some(storage) = stores.sqlite {
        storage.close().await?;
    }

    info!("scrubber serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scrubber={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
