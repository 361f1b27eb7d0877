// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence directory: who is active at a location, with live updates.
//!
//! Reads always go to the store. Live updates are the presence events on the
//! location scope of the bus, filtered and deduplicated by session version.

use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use tracing::debug;

use wolfpack_bus::{EventBus, Subscription};
use wolfpack_core::events::{EventPayload, PresenceChange, Scope};
use wolfpack_core::types::MembershipSession;
use wolfpack_core::{PackStorage, WolfpackError};

/// Read model over active membership sessions.
pub struct PresenceDirectory {
    storage: Arc<dyn PackStorage>,
    bus: Arc<EventBus>,
}

impl PresenceDirectory {
    pub fn new(storage: Arc<dyn PackStorage>, bus: Arc<EventBus>) -> Self {
        Self { storage, bus }
    }

    /// Active sessions at a location, most recently joined first.
    pub async fn list_active(
        &self,
        location_id: &str,
    ) -> Result<Vec<MembershipSession>, WolfpackError> {
        self.storage.list_active_sessions(location_id).await
    }

    /// Live presence changes at a location from now on.
    pub async fn subscribe(&self, location_id: &str) -> Result<PresenceStream, WolfpackError> {
        let inner = self.bus.subscribe(&Scope::location(location_id)).await?;
        Ok(PresenceStream::new(inner, HashMap::new()))
    }

    /// Presence changes after `after_seq` on the location scope, then live.
    pub fn resume(&self, location_id: &str, after_seq: i64) -> PresenceStream {
        let inner = self.bus.subscribe_from(&Scope::location(location_id), after_seq);
        PresenceStream::new(inner, HashMap::new())
    }

    /// Snapshot plus a stream of the changes that follow it.
    ///
    /// The subscription is opened before the snapshot is read, and every
    /// session in the snapshot seeds the stream's version table, so a change
    /// already reflected in the snapshot is never delivered again.
    pub async fn watch(
        &self,
        location_id: &str,
    ) -> Result<(Vec<MembershipSession>, PresenceStream), WolfpackError> {
        let inner = self.bus.subscribe(&Scope::location(location_id)).await?;
        let snapshot = self.storage.list_active_sessions(location_id).await?;
        let seen = snapshot
            .iter()
            .map(|s| (s.id.clone(), s.version))
            .collect();
        debug!(location_id, members = snapshot.len(), "presence watch started");
        Ok((snapshot, PresenceStream::new(inner, seen)))
    }
}

/// Presence-only view of a location subscription.
pub struct PresenceStream {
    inner: Subscription,
    seen: HashMap<String, i64>,
}

impl PresenceStream {
    fn new(inner: Subscription, seen: HashMap<String, i64>) -> Self {
        Self { inner, seen }
    }

    /// Sequence number of the last location event consumed, presence or not.
    pub fn last_seq(&self) -> i64 {
        self.inner.last_seq()
    }

    /// Next presence change with a session version newer than any seen.
    pub async fn recv(&mut self) -> Result<Option<PresenceChange>, WolfpackError> {
        while let Some(envelope) = self.inner.recv().await? {
            let EventPayload::Presence(change) = envelope.payload else {
                continue;
            };
            let known = self.seen.get(&change.session.id).copied().unwrap_or(0);
            if change.session.version <= known {
                continue;
            }
            self.seen
                .insert(change.session.id.clone(), change.session.version);
            return Ok(Some(change));
        }
        Ok(None)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<PresenceChange, WolfpackError>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.recv().await {
                Ok(Some(change)) => Some((Ok(change), Some(stream))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
