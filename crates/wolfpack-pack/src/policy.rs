// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access policy evaluation.
//!
//! Checks run in a fixed order and the first failure decides the reason:
//! membership, role and tab, directed-interaction rules, rate limits, and
//! finally item availability. The evaluator keeps no state of its own.

use std::sync::Arc;

use tracing::debug;

use wolfpack_config::model::PolicyConfig;
use wolfpack_core::policy::{AccessDecision, Action, DenyReason, PolicyContext};
use wolfpack_core::types::{Identity, InteractionKind, MemberAttributes, Role};
use wolfpack_core::{
    CatalogProvider, Clock, CompatibilityRules, IdentityProvider, PackStorage, TabProvider,
    WolfpackError,
};

use crate::collaborators::Collaborators;

pub struct PolicyEvaluator {
    storage: Arc<dyn PackStorage>,
    identities: Arc<dyn IdentityProvider>,
    tabs: Arc<dyn TabProvider>,
    catalog: Arc<dyn CatalogProvider>,
    rules: Arc<dyn CompatibilityRules>,
    clock: Arc<dyn Clock>,
    max_pending_orders: u32,
    max_unread_messages: u32,
}

impl PolicyEvaluator {
    pub fn new(
        storage: Arc<dyn PackStorage>,
        collaborators: &Collaborators,
        clock: Arc<dyn Clock>,
        config: &PolicyConfig,
    ) -> Self {
        Self {
            storage,
            identities: Arc::clone(&collaborators.identities),
            tabs: Arc::clone(&collaborators.tabs),
            catalog: Arc::clone(&collaborators.catalog),
            rules: Arc::clone(&collaborators.rules),
            clock,
            max_pending_orders: config.max_pending_orders,
            max_unread_messages: config.max_unread_messages,
        }
    }

    /// Unread directed messages a sender may have outstanding at one location.
    pub fn max_unread_messages(&self) -> u32 {
        self.max_unread_messages
    }

    /// Decide whether `actor` may perform `action` at `location_id`.
    ///
    /// `Err` only for collaborator or storage failures; a denial is an
    /// `Ok` decision carrying its reason.
    pub async fn can_perform(
        &self,
        actor: &Identity,
        location_id: &str,
        action: Action,
        context: &PolicyContext,
    ) -> Result<AccessDecision, WolfpackError> {
        let user_id = actor.user_id.as_str();

        if !actor.role.is_staff()
            && self
                .storage
                .find_active_session(user_id, location_id)
                .await?
                .is_none()
        {
            return Ok(AccessDecision::deny(DenyReason::NotAMember));
        }

        match action {
            Action::Broadcast if !matches!(actor.role, Role::Dj | Role::Admin) => {
                return Ok(AccessDecision::deny(DenyReason::InsufficientRole));
            }
            Action::Order if !self.tabs.has_open_tab(user_id, location_id).await? => {
                return Ok(AccessDecision::deny(DenyReason::NoOpenTab));
            }
            _ => {}
        }

        let directed = match (action.interaction_kind(), context.target_user_id.as_deref()) {
            (Some(kind), Some(target)) => Some((kind, target)),
            _ => None,
        };
        if let Some((kind, target)) = directed {
            if let Some(reason) = self.check_directed(actor, target, location_id, kind).await? {
                return Ok(AccessDecision::deny(reason));
            }
        }

        match action {
            Action::Order => {
                let pending = self.tabs.pending_orders(user_id, location_id).await?;
                if pending >= self.max_pending_orders {
                    return Ok(AccessDecision::deny(DenyReason::RateLimited));
                }
            }
            Action::Message if directed.is_some() => {
                let unread = self
                    .storage
                    .count_unread_sent(
                        user_id,
                        location_id,
                        InteractionKind::Message,
                        self.clock.now(),
                    )
                    .await?;
                if unread >= self.max_unread_messages {
                    return Ok(AccessDecision::deny(DenyReason::RateLimited));
                }
            }
            _ => {}
        }

        if action == Action::Order {
            for item in &context.item_ids {
                if !self.catalog.is_orderable(item).await? {
                    return Ok(AccessDecision::deny(DenyReason::ItemUnavailable));
                }
            }
        }

        Ok(AccessDecision::allow())
    }

    /// `can_perform`, with a denial turned into `Forbidden`.
    pub async fn authorize(
        &self,
        actor: &Identity,
        location_id: &str,
        action: Action,
        context: &PolicyContext,
    ) -> Result<(), WolfpackError> {
        let decision = self
            .can_perform(actor, location_id, action, context)
            .await?;
        if let Some(reason) = decision.reason {
            debug!(
                user_id = %actor.user_id,
                location_id,
                ?action,
                reason = %reason,
                "action denied"
            );
        }
        decision.into_result()
    }

    async fn check_directed(
        &self,
        actor: &Identity,
        target: &str,
        location_id: &str,
        kind: InteractionKind,
    ) -> Result<Option<DenyReason>, WolfpackError> {
        if self
            .storage
            .find_active_session(target, location_id)
            .await?
            .is_none()
        {
            return Ok(Some(DenyReason::RecipientNotPresent));
        }
        if target == actor.user_id {
            return Ok(Some(DenyReason::SelfInteraction));
        }

        let receiver: MemberAttributes = self
            .identities
            .lookup(target)
            .await?
            .map(|identity| identity.attributes)
            .unwrap_or_default();
        if !self.rules.permits(&actor.attributes, &receiver, kind) {
            return Ok(Some(DenyReason::IncompatibleInteraction));
        }
        Ok(None)
    }
}
