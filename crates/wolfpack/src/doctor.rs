// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wolfpack doctor` command implementation.
//!
//! Runs diagnostic checks against the Wolfpack environment to identify
//! configuration gaps, database problems, and an unreachable gateway.

use std::time::{Duration, Instant};

use wolfpack_config::WolfpackConfig;
use wolfpack_core::{PackStorage, WolfpackError};
use wolfpack_storage::{Database, SqliteStorage};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `wolfpack doctor` command.
pub async fn run_doctor(config: &WolfpackConfig) -> Result<(), WolfpackError> {
    let results = vec![
        check_config(config),
        check_migrations().await,
        check_database(config).await,
        check_gateway(config).await,
    ];

    println!();
    println!("  wolfpack doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_result(result));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_result(result: &CheckResult) -> String {
    let tag = match result.status {
        CheckStatus::Pass => "[OK]  ",
        CheckStatus::Warn => "[WARN]",
        CheckStatus::Fail => "[FAIL]",
    };
    format!(
        "    {tag} {:<20} {} ({}ms)",
        result.name,
        result.message,
        result.duration.as_millis()
    )
}

/// The config already validated; flag what would make the service useless.
fn check_config(config: &WolfpackConfig) -> CheckResult {
    let start = Instant::now();
    if config.locations.is_empty() {
        return CheckResult::new(
            "Configuration",
            CheckStatus::Warn,
            "no [[locations]] configured, nobody can be admitted",
            start,
        );
    }
    if config.tokens.is_empty() && config.gateway.enabled {
        return CheckResult::new(
            "Configuration",
            CheckStatus::Warn,
            "gateway enabled but no [[tokens]], every request will be rejected",
            start,
        );
    }
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!(
            "{} location(s), {} token(s), {} compatibility rule(s)",
            config.locations.len(),
            config.tokens.len(),
            config.compatibility.rules.len()
        ),
        start,
    )
}

/// Apply the embedded migrations to a scratch database.
async fn check_migrations() -> CheckResult {
    let start = Instant::now();
    match Database::open_in_memory().await {
        Ok(_) => CheckResult::new("Migrations", CheckStatus::Pass, "schema applies cleanly", start),
        Err(e) => CheckResult::new("Migrations", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_database(config: &WolfpackConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;
    if !std::path::Path::new(path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {path} (will be created on first run)"),
            start,
        );
    }

    let sqlite = match SqliteStorage::open(&config.storage).await {
        Ok(sqlite) => sqlite,
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };
    let outcome = match sqlite.health_check().await {
        Ok(()) => match sqlite.list_locations().await {
            Ok(stored) => CheckResult::new(
                "Database",
                CheckStatus::Pass,
                format!("connected, {} location(s) stored", stored.len()),
                start,
            ),
            Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
        },
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    };
    if let Err(e) = sqlite.close().await {
        tracing::warn!(error = %e, "failed to close database after doctor check");
    }
    outcome
}

async fn check_gateway(config: &WolfpackConfig) -> CheckResult {
    let start = Instant::now();
    if !config.gateway.enabled {
        return CheckResult::new("Gateway", CheckStatus::Pass, "disabled", start);
    }
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let connect = tokio::net::TcpStream::connect(addr.clone());
    match tokio::time::timeout(Duration::from_secs(3), connect).await {
        Ok(Ok(_)) => CheckResult::new("Gateway", CheckStatus::Pass, format!("listening on {addr}"), start),
        Ok(Err(_)) | Err(_) => CheckResult::new(
            "Gateway",
            CheckStatus::Warn,
            format!("not reachable at {addr} (service may not be running)"),
            start,
        ),
    }
}
