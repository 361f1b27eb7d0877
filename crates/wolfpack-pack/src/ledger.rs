// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction ledger: directed winks, waves, messages, and drink offers.
//!
//! Rows are append-only apart from `status` and `read_at`. Expiry is advisory:
//! an elapsed `expires_at` hides the row from the inbox but never deletes it.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use wolfpack_bus::EventBus;
use wolfpack_config::model::InteractionsConfig;
use wolfpack_core::events::{EventPayload, Scope};
use wolfpack_core::policy::{Action, DenyReason, PolicyContext};
use wolfpack_core::traits::Notification;
use wolfpack_core::types::{
    Identity, InteractionEvent, InteractionKind, InteractionStatus, new_id,
};
use wolfpack_core::{Clock, PackStorage, PushNotifier, WolfpackError};

use crate::pack::config_window;
use crate::policy::PolicyEvaluator;

pub struct InteractionLedger {
    storage: Arc<dyn PackStorage>,
    bus: Arc<EventBus>,
    policy: Arc<PolicyEvaluator>,
    notifier: Option<Arc<dyn PushNotifier>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InteractionLedger {
    pub fn new(
        storage: Arc<dyn PackStorage>,
        bus: Arc<EventBus>,
        policy: Arc<PolicyEvaluator>,
        notifier: Arc<dyn PushNotifier>,
        clock: Arc<dyn Clock>,
        config: &InteractionsConfig,
    ) -> Self {
        Self {
            storage,
            bus,
            policy,
            notifier: config.push_enabled.then_some(notifier),
            clock,
            ttl: config_window(config.ttl_secs),
        }
    }

    /// Record a directed interaction from `sender` to `receiver_id`.
    ///
    /// Nothing is written when the policy denies it. After the row commits
    /// the event goes to the receiver's private scope, to the location scope
    /// for presence-visible kinds, and then to the push notifier.
    pub async fn record(
        &self,
        sender: &Identity,
        receiver_id: &str,
        kind: InteractionKind,
        location_id: &str,
        payload: Option<String>,
    ) -> Result<InteractionEvent, WolfpackError> {
        self.policy
            .authorize(
                sender,
                location_id,
                Action::for_interaction(kind),
                &PolicyContext::directed_at(receiver_id),
            )
            .await?;

        let now = self.clock.now();
        let event = InteractionEvent {
            id: new_id(),
            sender_id: sender.user_id.clone(),
            receiver_id: receiver_id.to_string(),
            kind,
            location_id: location_id.to_string(),
            payload,
            status: InteractionStatus::Sent,
            created_at: now,
            read_at: None,
            expires_at: Some(now + self.ttl),
        };
        if kind == InteractionKind::Message {
            // The policy count above is advisory under concurrency; the
            // store re-checks it atomically with the insert.
            let limit = self.policy.max_unread_messages();
            if !self
                .storage
                .insert_interaction_within_limit(&event, limit)
                .await?
            {
                debug!(
                    sender_id = %event.sender_id,
                    location_id,
                    limit,
                    "message rate limit reached at insert"
                );
                return Err(WolfpackError::forbidden(DenyReason::RateLimited));
            }
        } else {
            self.storage.insert_interaction(&event).await?;
        }
        info!(
            interaction_id = %event.id,
            sender_id = %event.sender_id,
            receiver_id,
            kind = %kind,
            location_id,
            "interaction recorded"
        );

        self.fan_out(&Scope::user(receiver_id), &event).await;
        if kind.is_presence_visible() {
            self.fan_out(&Scope::location(location_id), &event).await;
        }
        self.push(sender, &event).await;

        Ok(event)
    }

    async fn fan_out(&self, scope: &Scope, event: &InteractionEvent) {
        if let Err(e) = self
            .bus
            .publish(scope, EventPayload::Interaction(event.clone()))
            .await
        {
            warn!(error = %e, scope = %scope, interaction_id = %event.id, "failed to publish interaction");
        }
    }

    async fn push(&self, sender: &Identity, event: &InteractionEvent) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let from = sender
            .display_name
            .clone()
            .unwrap_or_else(|| sender.user_id.clone());
        let notification = Notification {
            event_type: format!("interaction.{}", event.kind),
            title: format!("{from} sent you a {}", event.kind.as_ref().replace('_', " ")),
            body: event.payload.clone(),
            reference_id: event.id.clone(),
        };
        if let Err(e) = notifier.notify(&event.receiver_id, notification).await {
            warn!(error = %e, interaction_id = %event.id, "push hand-off failed");
        }
    }

    pub async fn get(&self, event_id: &str) -> Result<InteractionEvent, WolfpackError> {
        self.storage
            .get_interaction(event_id)
            .await?
            .ok_or_else(|| WolfpackError::InteractionNotFound(event_id.to_string()))
    }

    /// Mark an interaction read. Idempotent.
    pub async fn mark_read(&self, event_id: &str) -> Result<InteractionEvent, WolfpackError> {
        let event = self
            .storage
            .mark_interaction_read(event_id, self.clock.now())
            .await?
            .ok_or_else(|| WolfpackError::InteractionNotFound(event_id.to_string()))?;
        debug!(interaction_id = event_id, status = %event.status, "interaction marked read");
        Ok(event)
    }

    /// Unread, unexpired interactions for `receiver_id`, newest first.
    pub async fn inbox(&self, receiver_id: &str) -> Result<Vec<InteractionEvent>, WolfpackError> {
        self.storage
            .unread_interactions(receiver_id, self.clock.now())
            .await
    }

    /// Flip elapsed `sent` interactions to `expired`. Returns how many changed.
    pub async fn expire_elapsed(&self) -> Result<u64, WolfpackError> {
        let n = self.storage.expire_interactions(self.clock.now()).await?;
        if n > 0 {
            debug!(count = n, "interactions expired");
        }
        Ok(n)
    }
}
