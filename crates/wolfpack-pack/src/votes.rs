// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DJ polls: one vote per member per poll, re-voting replaces the choice.

use std::sync::Arc;

use tracing::{debug, warn};

use wolfpack_bus::EventBus;
use wolfpack_core::events::{EventPayload, Scope};
use wolfpack_core::policy::{Action, PolicyContext};
use wolfpack_core::types::{Identity, Vote};
use wolfpack_core::{Clock, PackStorage, WolfpackError};

use crate::policy::PolicyEvaluator;

pub struct VoteService {
    storage: Arc<dyn PackStorage>,
    bus: Arc<EventBus>,
    policy: Arc<PolicyEvaluator>,
    clock: Arc<dyn Clock>,
}

impl VoteService {
    pub fn new(
        storage: Arc<dyn PackStorage>,
        bus: Arc<EventBus>,
        policy: Arc<PolicyEvaluator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            bus,
            policy,
            clock,
        }
    }

    pub async fn cast_vote(
        &self,
        actor: &Identity,
        location_id: &str,
        poll_id: &str,
        option: &str,
    ) -> Result<Vote, WolfpackError> {
        self.policy
            .authorize(actor, location_id, Action::Vote, &PolicyContext::default())
            .await?;

        let vote = Vote {
            poll_id: poll_id.to_string(),
            location_id: location_id.to_string(),
            user_id: actor.user_id.clone(),
            option: option.to_string(),
            cast_at: self.clock.now(),
        };
        self.storage.upsert_vote(&vote).await?;
        debug!(poll_id, user_id = %vote.user_id, option, "vote cast");

        if let Err(e) = self
            .bus
            .publish(&Scope::location(location_id), EventPayload::VoteCast(vote.clone()))
            .await
        {
            warn!(error = %e, poll_id, "failed to publish vote");
        }
        Ok(vote)
    }

    /// Vote counts per option, highest first.
    pub async fn tally(&self, poll_id: &str) -> Result<Vec<(String, u64)>, WolfpackError> {
        self.storage.tally_votes(poll_id).await
    }
}
