// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wolfpack serve` command implementation.
//!
//! Opens the store, seeds configured locations, runs a catch-up sweep, then
//! runs the reaper and the gateway until a shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use wolfpack_config::WolfpackConfig;
use wolfpack_core::{Clock, PackStorage, SystemClock, WolfpackError};
use wolfpack_gateway::{GatewayState, ServerConfig, start_server};
use wolfpack_pack::{Collaborators, Pack};
use wolfpack_storage::SqliteStorage;

use crate::shutdown;

/// Open the store and assemble the pack for `config`.
pub async fn open_pack(config: &WolfpackConfig) -> Result<(SqliteStorage, Arc<Pack>), WolfpackError> {
    let sqlite = SqliteStorage::open(&config.storage).await?;
    let storage: Arc<dyn PackStorage> = Arc::new(sqlite.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let pack = Arc::new(Pack::new(
        config,
        storage,
        clock,
        Collaborators::from_config(config),
    ));
    pack.seed_locations(&config.locations).await?;
    Ok((sqlite, pack))
}

/// Runs the `wolfpack serve` command.
pub async fn run_serve(config: WolfpackConfig) -> Result<(), WolfpackError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting wolfpack serve");

    let (sqlite, pack) = open_pack(&config).await?;

    // Sessions that went idle while the service was down.
    let report = pack.reaper().sweep_once().await?;
    info!(
        expired_sessions = report.expired_sessions.len(),
        expired_interactions = report.expired_interactions,
        "startup sweep complete"
    );

    let cancel = shutdown::install_signal_handler();
    let reaper = pack.reaper().spawn(cancel.clone());

    let served = if config.gateway.enabled {
        let state = GatewayState::from_config(Arc::clone(&pack), &config);
        start_server(&ServerConfig::from(&config.gateway), state, cancel.clone()).await
    } else {
        info!("gateway disabled, running reaper only");
        cancel.cancelled().await;
        Ok(())
    };

    // A gateway failure still stops the reaper before returning.
    cancel.cancel();
    if let Err(e) = reaper.await {
        tracing::warn!(error = %e, "reaper task ended abnormally");
    }
    sqlite.close().await?;
    info!("wolfpack stopped");
    served
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wolfpack={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
