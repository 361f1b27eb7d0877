// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background sweep that expires idle sessions and elapsed interactions.
//!
//! Each sweep is idempotent, so overlapping sweeps (or a manual `sweep` run
//! next to a live server) never transition a row twice.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wolfpack_core::WolfpackError;

use crate::ledger::InteractionLedger;
use crate::membership::MembershipStore;

/// What one sweep changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_sessions: Vec<String>,
    pub expired_interactions: u64,
}

pub struct Reaper {
    membership: Arc<MembershipStore>,
    ledger: Arc<InteractionLedger>,
    interval: Duration,
}

impl Reaper {
    pub fn new(
        membership: Arc<MembershipStore>,
        ledger: Arc<InteractionLedger>,
        interval: Duration,
    ) -> Self {
        Self {
            membership,
            ledger,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep.
    pub async fn sweep_once(&self) -> Result<SweepReport, WolfpackError> {
        let expired_sessions = self.membership.reap_expired().await?;
        let expired_interactions = self.ledger.expire_elapsed().await?;
        Ok(SweepReport {
            expired_sessions,
            expired_interactions,
        })
    }

    /// Sweep on every tick until `cancel` fires. A failed sweep is logged and
    /// retried on the next tick.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "reaper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(report) => debug!(
                            sessions = report.expired_sessions.len(),
                            interactions = report.expired_interactions,
                            "sweep complete"
                        ),
                        Err(e) => warn!(error = %e, "sweep failed (will retry)"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("reaper shutting down");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
