// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wolfpack - location-gated membership and real-time presence.
//!
//! This is the binary entry point for the Wolfpack service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod doctor;
mod locations;
mod serve;
mod shutdown;
mod sweep;

/// Wolfpack - location-gated membership and real-time presence.
#[derive(Parser, Debug)]
#[command(name = "wolfpack", version, about, long_about = None)]
struct Cli {
    /// Explicit config file instead of the XDG lookup.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the service: reaper plus HTTP/WebSocket gateway.
    Serve,
    /// Run one expiry sweep against the database and exit.
    Sweep,
    /// List configured and stored locations.
    Locations {
        /// Upsert the configured `[[locations]]` before listing.
        #[arg(long)]
        seed: bool,
    },
    /// Run diagnostic checks.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => wolfpack_config::load_and_validate_path(path),
        None => wolfpack_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            wolfpack_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Sweep) => sweep::run_sweep(&config).await,
        Some(Commands::Locations { seed }) => locations::run_locations(&config, seed).await,
        Some(Commands::Doctor) => doctor::run_doctor(&config).await,
        None => {
            println!("wolfpack: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
