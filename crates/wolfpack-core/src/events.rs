// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped domain events carried by the event bus and persisted in the event log.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::types::{ChatMessage, InteractionEvent, MembershipSession, Moderation, Vote};

/// Partition key for ordering and subscription on the event bus.
///
/// Sequence numbers are assigned per scope; there is no ordering across scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scope {
    /// Location-wide channel: presence, public chat, broadcasts, votes.
    Location { location_id: String },
    /// A sub-room within a location.
    Room { location_id: String, room: String },
    /// Private inbox of a single user.
    User { user_id: String },
}

impl Scope {
    pub fn location(location_id: impl Into<String>) -> Self {
        Scope::Location {
            location_id: location_id.into(),
        }
    }

    pub fn room(location_id: impl Into<String>, room: impl Into<String>) -> Self {
        Scope::Room {
            location_id: location_id.into(),
            room: room.into(),
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Scope::User {
            user_id: user_id.into(),
        }
    }

    /// Scope for a chat message: its room when set, else the location.
    pub fn for_message(location_id: &str, room: Option<&str>) -> Self {
        match room {
            Some(room) => Scope::room(location_id, room),
            None => Scope::location(location_id),
        }
    }

    /// Stable storage key, e.g. `location:bar-1` or `room:bar-1:dancefloor`.
    ///
    /// `%` and `:` inside an id are percent-escaped so distinct scopes never
    /// share a key.
    pub fn key(&self) -> String {
        match self {
            Scope::Location { location_id } => format!("location:{}", escape_key_part(location_id)),
            Scope::Room { location_id, room } => format!(
                "room:{}:{}",
                escape_key_part(location_id),
                escape_key_part(room)
            ),
            Scope::User { user_id } => format!("user:{}", escape_key_part(user_id)),
        }
    }
}

fn escape_key_part(part: &str) -> Cow<'_, str> {
    if part.contains(['%', ':']) {
        Cow::Owned(part.replace('%', "%25").replace(':', "%3A"))
    } else {
        Cow::Borrowed(part)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// What happened to a member's presence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PresenceChangeKind {
    Joined,
    Updated,
    Left,
    Expired,
}

/// Presence change carrying the session snapshot after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChange {
    pub kind: PresenceChangeKind,
    pub session: MembershipSession,
}

/// Broadcast after a chat message is soft-deleted or flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationNotice {
    pub message_id: String,
    pub action: Moderation,
}

/// Payload of a bus event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    Presence(PresenceChange),
    Chat(ChatMessage),
    Interaction(InteractionEvent),
    VoteCast(Vote),
    Moderation(ModerationNotice),
}

impl EventPayload {
    /// Dot-separated event name stored alongside the payload.
    pub fn event_type(&self) -> String {
        match self {
            EventPayload::Presence(change) => format!("presence.{}", change.kind),
            EventPayload::Chat(msg) => format!("message.{}", msg.kind),
            EventPayload::Interaction(ev) => format!("interaction.{}", ev.kind),
            EventPayload::VoteCast(_) => "vote.cast".to_string(),
            EventPayload::Moderation(_) => "message.moderated".to_string(),
        }
    }
}

/// A persisted, sequenced event as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub scope: Scope,
    /// Monotonic per-scope sequence number, starting at 1.
    pub seq: i64,
    pub payload: EventPayload,
    pub published_at: DateTime<Utc>,
}
