// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store contract.
//!
//! The store is the single source of truth and sole mutator of membership
//! sessions and the append-only ledgers. Two primitives matter beyond plain
//! CRUD: the atomic active-session upsert used for idempotent admission, and
//! the per-scope sequenced event log that backs bus replay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WolfpackError;
use crate::events::{EventPayload, Envelope, Scope};
use crate::types::{
    ChatMessage, InteractionEvent, InteractionKind, Location, MembershipSession, Moderation,
    Position, ProfileUpdate, Vote,
};

/// Result of the atomic "find active or create" admission step.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmitOutcome {
    pub session: MembershipSession,
    /// `true` when a new active row was inserted, `false` when an existing
    /// active session was refreshed in place.
    pub created: bool,
}

#[async_trait]
pub trait PackStorage: Send + Sync {
    // --- Locations ---

    /// Insert or replace a location (operator-only reference data).
    async fn upsert_location(&self, location: &Location) -> Result<(), WolfpackError>;

    async fn get_location(&self, id: &str) -> Result<Option<Location>, WolfpackError>;

    async fn list_locations(&self) -> Result<Vec<Location>, WolfpackError>;

    // --- Membership sessions ---

    /// Atomically insert `candidate` as the active session for its
    /// (user, location) pair, or bump `last_activity_at` of the existing one.
    async fn admit_session(
        &self,
        candidate: &MembershipSession,
    ) -> Result<AdmitOutcome, WolfpackError>;

    async fn get_session(&self, id: &str) -> Result<Option<MembershipSession>, WolfpackError>;

    async fn find_active_session(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<MembershipSession>, WolfpackError>;

    /// Bump `last_activity_at` of an active session. Returns `false` when no
    /// active session has that id.
    async fn touch_session(&self, id: &str, at: DateTime<Utc>) -> Result<bool, WolfpackError>;

    /// Transition an active session to `left`. Returns the updated row only
    /// when the transition happened.
    async fn leave_session(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipSession>, WolfpackError>;

    /// Apply profile/position changes to an active session and bump its
    /// version. Returns `None` when no active session has that id.
    async fn update_session_presence(
        &self,
        id: &str,
        profile: &ProfileUpdate,
        position: Option<Position>,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipSession>, WolfpackError>;

    /// Transition every active session with `last_activity_at < cutoff` to
    /// `expired` in one statement, returning exactly the rows transitioned.
    async fn expire_sessions(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MembershipSession>, WolfpackError>;

    /// Active sessions at a location, most recently joined first, ties by id.
    async fn list_active_sessions(
        &self,
        location_id: &str,
    ) -> Result<Vec<MembershipSession>, WolfpackError>;

    // --- Event log ---

    /// Assign the next sequence number in `scope`, persist the payload (chat
    /// payloads also write their chat row) in one transaction, and return the
    /// envelope.
    async fn append_event(
        &self,
        scope: &Scope,
        payload: EventPayload,
        at: DateTime<Utc>,
    ) -> Result<Envelope, WolfpackError>;

    /// Persisted events in `scope` with `seq > after_seq`, ascending.
    async fn events_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<Envelope>, WolfpackError>;

    /// Highest assigned sequence number in `scope`, 0 when empty.
    async fn latest_seq(&self, scope: &Scope) -> Result<i64, WolfpackError>;

    // --- Interactions ---

    async fn insert_interaction(&self, event: &InteractionEvent) -> Result<(), WolfpackError>;

    /// Insert `event` only while its sender has fewer than `max_unread`
    /// unread, unexpired interactions of the same kind at the location.
    /// The count and the insert are one atomic step. Returns `false` when
    /// the limit was reached and nothing was written.
    async fn insert_interaction_within_limit(
        &self,
        event: &InteractionEvent,
        max_unread: u32,
    ) -> Result<bool, WolfpackError>;

    async fn get_interaction(&self, id: &str) -> Result<Option<InteractionEvent>, WolfpackError>;

    /// Transition a `sent` interaction to `read`. Returns the row as it is
    /// after the call (unchanged if already read), `None` if unknown.
    async fn mark_interaction_read(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<InteractionEvent>, WolfpackError>;

    /// Unread, unexpired interactions for a receiver, newest first.
    async fn unread_interactions(
        &self,
        receiver_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>, WolfpackError>;

    /// Count of the sender's unread interactions of `kind` at a location.
    async fn count_unread_sent(
        &self,
        sender_id: &str,
        location_id: &str,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> Result<u32, WolfpackError>;

    /// Mark `sent` interactions whose expiry has elapsed as `expired`.
    async fn expire_interactions(&self, now: DateTime<Utc>) -> Result<u64, WolfpackError>;

    // --- Chat ---

    async fn get_chat_message(&self, id: &str) -> Result<Option<ChatMessage>, WolfpackError>;

    /// Non-deleted chat messages in `scope` with `seq > after_seq`, ascending.
    async fn chat_messages_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, WolfpackError>;

    /// Apply a moderation action. Returns the message after the call and
    /// whether anything changed; `None` if unknown.
    async fn moderate_chat_message(
        &self,
        id: &str,
        action: &Moderation,
    ) -> Result<Option<(ChatMessage, bool)>, WolfpackError>;

    // --- Votes ---

    /// Insert or replace the user's vote in a poll.
    async fn upsert_vote(&self, vote: &Vote) -> Result<(), WolfpackError>;

    /// Vote counts per option, highest first.
    async fn tally_votes(&self, poll_id: &str) -> Result<Vec<(String, u64)>, WolfpackError>;

    // --- Lifecycle ---

    /// Cheap liveness probe.
    async fn health_check(&self) -> Result<(), WolfpackError>;
}
