// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wolfpack locations` command implementation.

use wolfpack_config::WolfpackConfig;
use wolfpack_core::types::Location;
use wolfpack_core::{PackStorage, WolfpackError};
use wolfpack_storage::SqliteStorage;

/// List stored venues, optionally seeding `[[locations]]` first.
pub async fn run_locations(config: &WolfpackConfig, seed: bool) -> Result<(), WolfpackError> {
    let sqlite = SqliteStorage::open(&config.storage).await?;
    if seed {
        for cfg in &config.locations {
            sqlite
                .upsert_location(&wolfpack_pack::pack::location_from_config(cfg))
                .await?;
        }
        println!("seeded {} location(s)", config.locations.len());
    }

    let stored = sqlite.list_locations().await?;
    println!();
    println!("  {:<16} {:<24} {:>11} {:>12} {:>8}", "ID", "NAME", "LAT", "LON", "RADIUS");
    for loc in &stored {
        println!("{}", format_row(loc));
    }
    let unseeded: Vec<&str> = config
        .locations
        .iter()
        .filter(|c| !stored.iter().any(|s| s.id == c.id))
        .map(|c| c.id.as_str())
        .collect();
    if !unseeded.is_empty() {
        println!();
        println!("  configured but not stored: {}", unseeded.join(", "));
        println!("  Run with --seed (or start `wolfpack serve`) to store them.");
    }
    println!();

    sqlite.close().await
}

fn format_row(loc: &Location) -> String {
    format!(
        "  {:<16} {:<24} {:>11.6} {:>12.6} {:>7.1}m",
        loc.id, loc.name, loc.center.latitude, loc.center.longitude, loc.radius_meters
    )
}
