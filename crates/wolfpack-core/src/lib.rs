// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Wolfpack presence service.
//!
//! This crate provides the foundational domain types, the error taxonomy,
//! the pure geofence evaluator, and the trait seams to the persistent store
//! and external collaborators (identity, billing, catalog, push).

pub mod clock;
pub mod error;
pub mod events;
pub mod geofence;
pub mod policy;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::WolfpackError;
pub use events::{Envelope, EventPayload, PresenceChange, PresenceChangeKind, Scope};
pub use geofence::GeofenceResult;
pub use policy::{AccessDecision, Action, DenyReason, PolicyContext};
pub use types::{
    ChatMessage, Coordinates, Identity, InteractionEvent, InteractionKind, InteractionStatus,
    Location, MembershipSession, MessageKind, Role, SessionStatus, Vote,
};

pub use traits::{
    CatalogProvider, CompatibilityRules, IdentityProvider, PackStorage, PushNotifier, TabProvider,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn wolfpack_error_variants_render() {
        let out = WolfpackError::OutOfRange {
            distance_meters: 101.0,
            radius_meters: 100.0,
        };
        assert!(out.to_string().contains("101.0m"));

        let forbidden = WolfpackError::forbidden(DenyReason::NoOpenTab);
        assert_eq!(forbidden.to_string(), "forbidden: no_open_tab");

        let storage = WolfpackError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        assert!(storage.deny_reason().is_none());
    }

    #[test]
    fn enum_strings_round_trip() {
        for status in [SessionStatus::Active, SessionStatus::Expired, SessionStatus::Left] {
            assert_eq!(SessionStatus::from_str(status.as_ref()).unwrap(), status);
        }
        for kind in [
            InteractionKind::Wink,
            InteractionKind::Wave,
            InteractionKind::Message,
            InteractionKind::DrinkOffer,
        ] {
            assert_eq!(InteractionKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(InteractionKind::DrinkOffer.to_string(), "drink_offer");
    }

    #[test]
    fn staff_roles() {
        assert!(!Role::Member.is_staff());
        assert!(Role::Dj.is_staff());
        assert!(Role::Bartender.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn fresh_interactions_respect_expiry() {
        let now = chrono::Utc::now();
        let mut ev = InteractionEvent {
            id: types::new_id(),
            sender_id: "a".into(),
            receiver_id: "b".into(),
            kind: InteractionKind::Wink,
            location_id: "bar".into(),
            payload: None,
            status: InteractionStatus::Sent,
            created_at: now,
            read_at: None,
            expires_at: Some(now + chrono::Duration::minutes(5)),
        };
        assert!(ev.is_fresh(now));
        assert!(!ev.is_fresh(now + chrono::Duration::minutes(5)));
        ev.status = InteractionStatus::Read;
        assert!(!ev.is_fresh(now));
    }
}
