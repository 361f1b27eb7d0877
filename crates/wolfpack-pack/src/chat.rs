// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped chat, DJ broadcasts, and moderation.
//!
//! A chat message is persisted by publishing it: the event log assigns its
//! scope sequence number and writes the chat row in the same transaction.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wolfpack_bus::EventBus;
use wolfpack_core::events::{Envelope, EventPayload, ModerationNotice, Scope};
use wolfpack_core::policy::{Action, DenyReason, PolicyContext};
use wolfpack_core::types::{ChatMessage, Identity, MessageKind, Moderation};
use wolfpack_core::{Clock, PackStorage, WolfpackError};

use crate::policy::PolicyEvaluator;

pub struct ChatService {
    storage: Arc<dyn PackStorage>,
    bus: Arc<EventBus>,
    policy: Arc<PolicyEvaluator>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
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

    /// Post a chat message to a location, or to one of its rooms.
    pub async fn post_message(
        &self,
        actor: &Identity,
        location_id: &str,
        room: Option<&str>,
        content: &str,
    ) -> Result<ChatMessage, WolfpackError> {
        self.policy
            .authorize(actor, location_id, Action::Message, &PolicyContext::default())
            .await?;
        let msg = ChatMessage::new(
            location_id,
            room.map(str::to_string),
            Some(actor.user_id.clone()),
            content,
            MessageKind::Chat,
            self.clock.now(),
        );
        self.persist(msg).await
    }

    /// Location-wide broadcast by a DJ or admin.
    pub async fn broadcast(
        &self,
        actor: &Identity,
        location_id: &str,
        content: &str,
    ) -> Result<ChatMessage, WolfpackError> {
        self.policy
            .authorize(actor, location_id, Action::Broadcast, &PolicyContext::default())
            .await?;
        let msg = ChatMessage::new(
            location_id,
            None,
            Some(actor.user_id.clone()),
            content,
            MessageKind::Broadcast,
            self.clock.now(),
        );
        let msg = self.persist(msg).await?;
        info!(message_id = %msg.id, location_id, seq = msg.seq, "broadcast sent");
        Ok(msg)
    }

    /// Authorless system announcement from an operator. No policy applies.
    pub async fn system_broadcast(
        &self,
        location_id: &str,
        content: &str,
    ) -> Result<ChatMessage, WolfpackError> {
        if self.storage.get_location(location_id).await?.is_none() {
            return Err(WolfpackError::LocationNotFound(location_id.to_string()));
        }
        let msg = ChatMessage::new(
            location_id,
            None,
            None,
            content,
            MessageKind::System,
            self.clock.now(),
        );
        self.persist(msg).await
    }

    async fn persist(&self, msg: ChatMessage) -> Result<ChatMessage, WolfpackError> {
        let scope = Scope::for_message(&msg.location_id, msg.room.as_deref());
        let envelope = self.bus.publish(&scope, EventPayload::Chat(msg)).await?;
        match envelope {
            Envelope {
                payload: EventPayload::Chat(msg),
                ..
            } => {
                debug!(message_id = %msg.id, scope = %scope, seq = msg.seq, "chat message stored");
                Ok(msg)
            }
            other => Err(WolfpackError::Internal(format!(
                "chat publish returned {} payload",
                other.payload.event_type()
            ))),
        }
    }

    /// Non-deleted messages in `scope` after `after_seq`, oldest first.
    pub async fn messages_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, WolfpackError> {
        self.storage
            .chat_messages_since(scope, after_seq, limit)
            .await
    }

    /// Soft-delete a message. Staff may delete anything, members only their
    /// own messages. Deleting twice is a no-op.
    pub async fn soft_delete(
        &self,
        actor: &Identity,
        message_id: &str,
    ) -> Result<ChatMessage, WolfpackError> {
        let existing = self.get(message_id).await?;
        let is_author = existing.author_id.as_deref() == Some(actor.user_id.as_str());
        if !actor.role.is_staff() && !is_author {
            return Err(WolfpackError::forbidden(DenyReason::InsufficientRole));
        }
        self.moderate(message_id, Moderation::SoftDelete).await
    }

    /// Flag a message for review. Flagging an already flagged message is a no-op.
    pub async fn flag(
        &self,
        message_id: &str,
        reason: &str,
    ) -> Result<ChatMessage, WolfpackError> {
        self.moderate(
            message_id,
            Moderation::Flag {
                reason: reason.to_string(),
            },
        )
        .await
    }

    pub async fn get(&self, message_id: &str) -> Result<ChatMessage, WolfpackError> {
        self.storage
            .get_chat_message(message_id)
            .await?
            .ok_or_else(|| WolfpackError::MessageNotFound(message_id.to_string()))
    }

    async fn moderate(
        &self,
        message_id: &str,
        action: Moderation,
    ) -> Result<ChatMessage, WolfpackError> {
        let (msg, changed) = self
            .storage
            .moderate_chat_message(message_id, &action)
            .await?
            .ok_or_else(|| WolfpackError::MessageNotFound(message_id.to_string()))?;
        if !changed {
            return Ok(msg);
        }

        info!(message_id, action = ?action, "message moderated");
        let scope = Scope::for_message(&msg.location_id, msg.room.as_deref());
        let notice = EventPayload::Moderation(ModerationNotice {
            message_id: message_id.to_string(),
            action,
        });
        if let Err(e) = self.bus.publish(&scope, notice).await {
            warn!(error = %e, message_id, "failed to publish moderation notice");
        }
        Ok(msg)
    }
}
