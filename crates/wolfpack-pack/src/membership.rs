// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Membership session lifecycle: admission, heartbeat, leave, and expiry.
//!
//! The store is the only writer of `membership_sessions`. Every presence
//! visible transition is published on the location scope after it commits.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use wolfpack_bus::EventBus;
use wolfpack_config::model::MembershipConfig;
use wolfpack_core::events::{EventPayload, PresenceChange, PresenceChangeKind, Scope};
use wolfpack_core::geofence;
use wolfpack_core::types::{Coordinates, MembershipSession, Position, ProfileUpdate};
use wolfpack_core::{Clock, PackStorage, WolfpackError};

use crate::pack::config_window;

/// Owns the (user, location) membership state machine.
pub struct MembershipStore {
    storage: Arc<dyn PackStorage>,
    bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    inactivity_window: Duration,
}

impl MembershipStore {
    pub fn new(
        storage: Arc<dyn PackStorage>,
        bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
        config: &MembershipConfig,
    ) -> Self {
        Self {
            storage,
            bus,
            clock,
            inactivity_window: config_window(config.inactivity_window_secs),
        }
    }

    /// How long a session may go without activity before the reaper expires it.
    pub fn inactivity_window(&self) -> Duration {
        self.inactivity_window
    }

    /// Admit `user_id` at `location_id` if `coords` fall inside the venue.
    ///
    /// Re-admitting a user with an active session refreshes it in place and
    /// returns it unchanged apart from `last_activity_at`.
    pub async fn admit(
        &self,
        user_id: &str,
        location_id: &str,
        coords: Coordinates,
    ) -> Result<MembershipSession, WolfpackError> {
        let location = self
            .storage
            .get_location(location_id)
            .await?
            .ok_or_else(|| WolfpackError::LocationNotFound(location_id.to_string()))?;

        let fence = geofence::evaluate(coords.latitude, coords.longitude, &location);
        if !fence.inside {
            debug!(
                user_id,
                location_id,
                distance_meters = fence.distance_meters,
                radius_meters = location.radius_meters,
                "admission rejected by geofence"
            );
            return Err(WolfpackError::OutOfRange {
                distance_meters: fence.distance_meters,
                radius_meters: location.radius_meters,
            });
        }

        let candidate = MembershipSession::new_active(user_id, location_id, self.clock.now());
        let outcome = self.storage.admit_session(&candidate).await?;

        if outcome.created {
            info!(
                session_id = %outcome.session.id,
                user_id,
                location_id,
                "member admitted"
            );
            self.announce(PresenceChangeKind::Joined, &outcome.session)
                .await;
        } else {
            debug!(session_id = %outcome.session.id, user_id, location_id, "admission refreshed");
        }
        Ok(outcome.session)
    }

    /// Record activity on an active session.
    pub async fn heartbeat(&self, session_id: &str) -> Result<(), WolfpackError> {
        if self
            .storage
            .touch_session(session_id, self.clock.now())
            .await?
        {
            Ok(())
        } else {
            Err(WolfpackError::SessionNotFound(session_id.to_string()))
        }
    }

    /// Check out. Leaving a session that already left or expired is a no-op.
    pub async fn leave(&self, session_id: &str) -> Result<(), WolfpackError> {
        match self
            .storage
            .leave_session(session_id, self.clock.now())
            .await?
        {
            Some(session) => {
                info!(session_id, user_id = %session.user_id, location_id = %session.location_id, "member left");
                self.announce(PresenceChangeKind::Left, &session).await;
                Ok(())
            }
            None => match self.storage.get_session(session_id).await? {
                Some(_) => Ok(()),
                None => Err(WolfpackError::SessionNotFound(session_id.to_string())),
            },
        }
    }

    /// Expire every active session idle for longer than the inactivity window.
    ///
    /// Returns exactly the ids transitioned by this call. A failed presence
    /// publish is logged and the sweep carries on with the next session.
    pub async fn reap_expired(&self) -> Result<Vec<String>, WolfpackError> {
        let cutoff = self.clock.now() - self.inactivity_window;
        let expired = self.storage.expire_sessions(cutoff).await?;

        for session in &expired {
            self.announce(PresenceChangeKind::Expired, session).await;
        }
        if !expired.is_empty() {
            info!(count = expired.len(), cutoff = %cutoff, "expired idle sessions");
        }
        Ok(expired.into_iter().map(|s| s.id).collect())
    }

    /// Merge profile fields into an active session.
    pub async fn update_profile(
        &self,
        session_id: &str,
        update: &ProfileUpdate,
    ) -> Result<MembershipSession, WolfpackError> {
        self.update_presence(session_id, update, None).await
    }

    /// Move an active session's coarse in-venue position.
    pub async fn update_position(
        &self,
        session_id: &str,
        position: Position,
    ) -> Result<MembershipSession, WolfpackError> {
        self.update_presence(session_id, &ProfileUpdate::default(), Some(position))
            .await
    }

    async fn update_presence(
        &self,
        session_id: &str,
        update: &ProfileUpdate,
        position: Option<Position>,
    ) -> Result<MembershipSession, WolfpackError> {
        let session = self
            .storage
            .update_session_presence(session_id, update, position, self.clock.now())
            .await?
            .ok_or_else(|| WolfpackError::SessionNotFound(session_id.to_string()))?;
        debug!(session_id, version = session.version, "presence updated");
        self.announce(PresenceChangeKind::Updated, &session).await;
        Ok(session)
    }

    /// Fetch a session in any status.
    pub async fn get(&self, session_id: &str) -> Result<MembershipSession, WolfpackError> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| WolfpackError::SessionNotFound(session_id.to_string()))
    }

    pub async fn active_session(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<MembershipSession>, WolfpackError> {
        self.storage.find_active_session(user_id, location_id).await
    }

    // The state change is already committed; a failed publish must not turn
    // it into an error for the caller.
    async fn announce(&self, kind: PresenceChangeKind, session: &MembershipSession) {
        let scope = Scope::location(session.location_id.clone());
        let payload = EventPayload::Presence(PresenceChange {
            kind,
            session: session.clone(),
        });
        if let Err(e) = self.bus.publish(&scope, payload).await {
            warn!(
                error = %e,
                session_id = %session.id,
                kind = %kind,
                "failed to publish presence change"
            );
        }
    }
}
