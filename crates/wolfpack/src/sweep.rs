// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wolfpack sweep`: one expiry pass, for cron-driven deployments.

use wolfpack_config::WolfpackConfig;
use wolfpack_core::WolfpackError;

use crate::serve::open_pack;

pub async fn run_sweep(config: &WolfpackConfig) -> Result<(), WolfpackError> {
    let (sqlite, pack) = open_pack(config).await?;
    let report = pack.reaper().sweep_once().await?;
    println!(
        "expired {} session(s), {} interaction(s)",
        report.expired_sessions.len(),
        report.expired_interactions
    );
    for id in &report.expired_sessions {
        println!("  {id}");
    }
    sqlite.close().await
}
