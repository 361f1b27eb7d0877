// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of every pack service over one store, bus, and clock.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use wolfpack_bus::EventBus;
use wolfpack_config::WolfpackConfig;
use wolfpack_config::model::LocationConfig;
use wolfpack_config::validation::MAX_WINDOW_SECS;
use wolfpack_core::types::{Coordinates, Location};
use wolfpack_core::{Clock, IdentityProvider, PackStorage, WolfpackError};

use crate::chat::ChatService;
use crate::collaborators::Collaborators;
use crate::ledger::InteractionLedger;
use crate::membership::MembershipStore;
use crate::policy::PolicyEvaluator;
use crate::presence::PresenceDirectory;
use crate::reaper::Reaper;
use crate::votes::VoteService;

/// The assembled service graph. Cheap to share as `Arc<Pack>`.
pub struct Pack {
    pub storage: Arc<dyn PackStorage>,
    pub bus: Arc<EventBus>,
    pub clock: Arc<dyn Clock>,
    pub identities: Arc<dyn IdentityProvider>,
    pub membership: Arc<MembershipStore>,
    pub presence: Arc<PresenceDirectory>,
    pub policy: Arc<PolicyEvaluator>,
    pub ledger: Arc<InteractionLedger>,
    pub chat: Arc<ChatService>,
    pub votes: Arc<VoteService>,
    sweep_interval: Duration,
}

impl Pack {
    pub fn new(
        config: &WolfpackConfig,
        storage: Arc<dyn PackStorage>,
        clock: Arc<dyn Clock>,
        collaborators: Collaborators,
    ) -> Self {
        let bus = Arc::new(EventBus::new(
            Arc::clone(&storage),
            Arc::clone(&clock),
            &config.bus,
        ));
        let membership = Arc::new(MembershipStore::new(
            Arc::clone(&storage),
            Arc::clone(&bus),
            Arc::clone(&clock),
            &config.membership,
        ));
        let presence = Arc::new(PresenceDirectory::new(Arc::clone(&storage), Arc::clone(&bus)));
        let policy = Arc::new(PolicyEvaluator::new(
            Arc::clone(&storage),
            &collaborators,
            Arc::clone(&clock),
            &config.policy,
        ));
        let ledger = Arc::new(InteractionLedger::new(
            Arc::clone(&storage),
            Arc::clone(&bus),
            Arc::clone(&policy),
            Arc::clone(&collaborators.notifier),
            Arc::clone(&clock),
            &config.interactions,
        ));
        let chat = Arc::new(ChatService::new(
            Arc::clone(&storage),
            Arc::clone(&bus),
            Arc::clone(&policy),
            Arc::clone(&clock),
        ));
        let votes = Arc::new(VoteService::new(
            Arc::clone(&storage),
            Arc::clone(&bus),
            Arc::clone(&policy),
            Arc::clone(&clock),
        ));

        Self {
            storage,
            bus,
            clock,
            identities: collaborators.identities,
            membership,
            presence,
            policy,
            ledger,
            chat,
            votes,
            sweep_interval: Duration::from_secs(
                config.membership.sweep_interval_secs.clamp(1, MAX_WINDOW_SECS),
            ),
        }
    }

    /// A reaper over this pack's membership store and ledger.
    pub fn reaper(&self) -> Reaper {
        Reaper::new(
            Arc::clone(&self.membership),
            Arc::clone(&self.ledger),
            self.sweep_interval,
        )
    }

    /// Upsert the configured `[[locations]]`. Returns how many were written.
    pub async fn seed_locations(&self, locations: &[LocationConfig]) -> Result<usize, WolfpackError> {
        for cfg in locations {
            self.storage.upsert_location(&location_from_config(cfg)).await?;
        }
        if !locations.is_empty() {
            info!(count = locations.len(), "locations seeded from config");
        }
        Ok(locations.len())
    }
}

/// A configured window in seconds as a timestamp offset, saturating at the
/// largest value validation accepts so date arithmetic cannot overflow.
pub(crate) fn config_window(secs: u64) -> chrono::Duration {
    let secs = i64::try_from(secs.min(MAX_WINDOW_SECS)).unwrap_or(i64::MAX);
    chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::zero())
}

pub fn location_from_config(cfg: &LocationConfig) -> Location {
    Location {
        id: cfg.id.clone(),
        name: cfg.name.clone(),
        center: Coordinates::new(cfg.latitude, cfg.longitude),
        radius_meters: cfg.radius_meters,
    }
}
