// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`PackStorage`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use wolfpack_config::model::StorageConfig;
use wolfpack_core::WolfpackError;
use wolfpack_core::events::{Envelope, EventPayload, Scope};
use wolfpack_core::traits::{AdmitOutcome, PackStorage};
use wolfpack_core::types::{
    ChatMessage, InteractionEvent, InteractionKind, Location, MembershipSession, Moderation,
    Position, ProfileUpdate, Vote,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store. Delegates every operation to the typed query modules.
#[derive(Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the configured database file and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, WolfpackError> {
        let db = Database::open_with(config).await?;
        debug!(path = %config.database_path, "SQLite storage initialized");
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Flush the WAL before shutdown.
    pub async fn close(&self) -> Result<(), WolfpackError> {
        self.db.checkpoint().await
    }
}

#[async_trait]
impl PackStorage for SqliteStorage {
    async fn upsert_location(&self, location: &Location) -> Result<(), WolfpackError> {
        queries::locations::upsert_location(&self.db, location).await
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, WolfpackError> {
        queries::locations::get_location(&self.db, id).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, WolfpackError> {
        queries::locations::list_locations(&self.db).await
    }

    async fn admit_session(
        &self,
        candidate: &MembershipSession,
    ) -> Result<AdmitOutcome, WolfpackError> {
        queries::sessions::admit(&self.db, candidate).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<MembershipSession>, WolfpackError> {
        queries::sessions::get(&self.db, id).await
    }

    async fn find_active_session(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<MembershipSession>, WolfpackError> {
        queries::sessions::find_active(&self.db, user_id, location_id).await
    }

    async fn touch_session(&self, id: &str, at: DateTime<Utc>) -> Result<bool, WolfpackError> {
        queries::sessions::touch(&self.db, id, at).await
    }

    async fn leave_session(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipSession>, WolfpackError> {
        queries::sessions::leave(&self.db, id, at).await
    }

    async fn update_session_presence(
        &self,
        id: &str,
        profile: &ProfileUpdate,
        position: Option<Position>,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipSession>, WolfpackError> {
        queries::sessions::update_presence(&self.db, id, profile, position, at).await
    }

    async fn expire_sessions(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MembershipSession>, WolfpackError> {
        queries::sessions::expire_idle(&self.db, cutoff).await
    }

    async fn list_active_sessions(
        &self,
        location_id: &str,
    ) -> Result<Vec<MembershipSession>, WolfpackError> {
        queries::sessions::list_active(&self.db, location_id).await
    }

    async fn append_event(
        &self,
        scope: &Scope,
        payload: EventPayload,
        at: DateTime<Utc>,
    ) -> Result<Envelope, WolfpackError> {
        queries::events::append(&self.db, scope, payload, at).await
    }

    async fn events_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<Envelope>, WolfpackError> {
        queries::events::since(&self.db, scope, after_seq, limit).await
    }

    async fn latest_seq(&self, scope: &Scope) -> Result<i64, WolfpackError> {
        queries::events::latest_seq(&self.db, scope).await
    }

    async fn insert_interaction(&self, event: &InteractionEvent) -> Result<(), WolfpackError> {
        queries::interactions::insert(&self.db, event).await
    }

    async fn insert_interaction_within_limit(
        &self,
        event: &InteractionEvent,
        max_unread: u32,
    ) -> Result<bool, WolfpackError> {
        queries::interactions::insert_within_limit(&self.db, event, max_unread).await
    }

    async fn get_interaction(&self, id: &str) -> Result<Option<InteractionEvent>, WolfpackError> {
        queries::interactions::get(&self.db, id).await
    }

    async fn mark_interaction_read(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<InteractionEvent>, WolfpackError> {
        queries::interactions::mark_read(&self.db, id, at).await
    }

    async fn unread_interactions(
        &self,
        receiver_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>, WolfpackError> {
        queries::interactions::unread_for(&self.db, receiver_id, now).await
    }

    async fn count_unread_sent(
        &self,
        sender_id: &str,
        location_id: &str,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> Result<u32, WolfpackError> {
        queries::interactions::count_unread_sent(&self.db, sender_id, location_id, kind, now).await
    }

    async fn expire_interactions(&self, now: DateTime<Utc>) -> Result<u64, WolfpackError> {
        queries::interactions::expire_due(&self.db, now).await
    }

    async fn get_chat_message(&self, id: &str) -> Result<Option<ChatMessage>, WolfpackError> {
        queries::chat::get(&self.db, id).await
    }

    async fn chat_messages_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, WolfpackError> {
        queries::chat::since(&self.db, scope, after_seq, limit).await
    }

    async fn moderate_chat_message(
        &self,
        id: &str,
        action: &Moderation,
    ) -> Result<Option<(ChatMessage, bool)>, WolfpackError> {
        queries::chat::moderate(&self.db, id, action).await
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<(), WolfpackError> {
        queries::votes::upsert(&self.db, vote).await
    }

    async fn tally_votes(&self, poll_id: &str) -> Result<Vec<(String, u64)>, WolfpackError> {
        queries::votes::tally(&self.db, poll_id).await
    }

    async fn health_check(&self) -> Result<(), WolfpackError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
