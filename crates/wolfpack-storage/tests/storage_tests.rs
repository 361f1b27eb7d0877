// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite store against a temp database file.

use chrono::{DateTime, Duration, TimeZone, Utc};
use wolfpack_core::events::{EventPayload, PresenceChange, PresenceChangeKind, Scope};
use wolfpack_core::traits::PackStorage;
use wolfpack_core::types::{
    ChatMessage, Coordinates, InteractionEvent, InteractionKind, InteractionStatus, Location,
    MembershipSession, MessageKind, Moderation, Position, ProfileUpdate, SessionStatus, Vote,
};
use wolfpack_storage::{Database, SqliteStorage};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 20, 0, 0).unwrap()
}

async fn setup() -> (SqliteStorage, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wolfpack.db");
    let db = Database::open(path.to_str().unwrap()).await.unwrap();
    let storage = SqliteStorage::new(db);
    storage
        .upsert_location(&Location {
            id: "den".into(),
            name: "The Den".into(),
            center: Coordinates::new(34.0522, -118.2437),
            radius_meters: 100.0,
        })
        .await
        .unwrap();
    (storage, dir)
}

fn interaction(sender: &str, receiver: &str, kind: InteractionKind, at: DateTime<Utc>) -> InteractionEvent {
    InteractionEvent {
        id: wolfpack_core::types::new_id(),
        sender_id: sender.into(),
        receiver_id: receiver.into(),
        kind,
        location_id: "den".into(),
        payload: None,
        status: InteractionStatus::Sent,
        created_at: at,
        read_at: None,
        expires_at: Some(at + Duration::hours(24)),
    }
}

#[tokio::test]
async fn location_upsert_replaces_geometry() {
    let (storage, _dir) = setup().await;
    let mut loc = storage.get_location("den").await.unwrap().unwrap();
    loc.radius_meters = 150.0;
    storage.upsert_location(&loc).await.unwrap();

    let all = storage.list_locations().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].radius_meters, 150.0);
    assert!(storage.get_location("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn admission_upsert_keeps_one_active_row() {
    let (storage, _dir) = setup().await;

    let first = storage
        .admit_session(&MembershipSession::new_active("u1", "den", t0()))
        .await
        .unwrap();
    assert!(first.created);

    let later = t0() + Duration::minutes(5);
    let second = storage
        .admit_session(&MembershipSession::new_active("u1", "den", later))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.session.id, first.session.id);
    assert_eq!(second.session.joined_at, t0());
    assert_eq!(second.session.last_activity_at, later);
    assert_eq!(second.session.version, 1);

    assert_eq!(storage.list_active_sessions("den").await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_admissions_resolve_to_one_session() {
    let (storage, _dir) = setup().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let storage = storage.clone();
            tokio::spawn(async move {
                storage
                    .admit_session(&MembershipSession::new_active(
                        "u1",
                        "den",
                        t0() + Duration::seconds(i),
                    ))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        if outcome.created {
            created += 1;
        }
        ids.push(outcome.session.id);
    }
    ids.dedup();
    assert_eq!(created, 1);
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn leave_is_one_way_and_allows_readmission() {
    let (storage, _dir) = setup().await;
    let s = storage
        .admit_session(&MembershipSession::new_active("u1", "den", t0()))
        .await
        .unwrap()
        .session;

    let left = storage.leave_session(&s.id, t0()).await.unwrap().unwrap();
    assert_eq!(left.status, SessionStatus::Left);
    assert_eq!(left.version, 2);
    assert!(storage.leave_session(&s.id, t0()).await.unwrap().is_none());
    assert!(!storage.touch_session(&s.id, t0()).await.unwrap());

    let again = storage
        .admit_session(&MembershipSession::new_active("u1", "den", t0()))
        .await
        .unwrap();
    assert!(again.created);
    assert_ne!(again.session.id, s.id);
}

#[tokio::test]
async fn expiry_is_strictly_older_than_cutoff_and_idempotent() {
    let (storage, _dir) = setup().await;
    let stale = storage
        .admit_session(&MembershipSession::new_active("old", "den", t0()))
        .await
        .unwrap()
        .session;
    let edge = storage
        .admit_session(&MembershipSession::new_active(
            "edge",
            "den",
            t0() + Duration::minutes(1),
        ))
        .await
        .unwrap()
        .session;

    let cutoff = t0() + Duration::minutes(1);
    let expired = storage.expire_sessions(cutoff).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, stale.id);
    assert_eq!(expired[0].status, SessionStatus::Expired);

    assert!(storage.expire_sessions(cutoff).await.unwrap().is_empty());
    let active = storage.list_active_sessions("den").await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, edge.id);
}

#[tokio::test]
async fn presence_update_merges_profile_and_bumps_version() {
    let (storage, _dir) = setup().await;
    let s = storage
        .admit_session(&MembershipSession::new_active("u1", "den", t0()))
        .await
        .unwrap()
        .session;

    let update = ProfileUpdate {
        vibe: Some("dancing".into()),
        ..Default::default()
    };
    let updated = storage
        .update_session_presence(&s.id, &update, Some(Position { x: 1.5, y: 2.0 }), t0())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.profile.vibe.as_deref(), Some("dancing"));
    assert_eq!(updated.position, Some(Position { x: 1.5, y: 2.0 }));

    let update = ProfileUpdate {
        table_label: Some("T4".into()),
        ..Default::default()
    };
    let updated = storage
        .update_session_presence(&s.id, &update, None, t0())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.version, 3);
    assert_eq!(updated.profile.vibe.as_deref(), Some("dancing"));
    assert_eq!(updated.profile.table_label.as_deref(), Some("T4"));
    assert_eq!(updated.position, Some(Position { x: 1.5, y: 2.0 }));
}

#[tokio::test]
async fn list_active_orders_by_join_desc_then_id() {
    let (storage, _dir) = setup().await;
    for user in ["a", "b"] {
        storage
            .admit_session(&MembershipSession::new_active(user, "den", t0()))
            .await
            .unwrap();
    }
    let newest = storage
        .admit_session(&MembershipSession::new_active(
            "c",
            "den",
            t0() + Duration::seconds(30),
        ))
        .await
        .unwrap()
        .session;

    let active = storage.list_active_sessions("den").await.unwrap();
    assert_eq!(active.len(), 3);
    assert_eq!(active[0].id, newest.id);
    assert!(active[1].id < active[2].id);
}

#[tokio::test]
async fn event_sequences_are_per_scope() {
    let (storage, _dir) = setup().await;
    let den = Scope::location("den");
    let inbox = Scope::user("u1");
    let session = MembershipSession::new_active("u1", "den", t0());

    for _ in 0..3 {
        storage
            .append_event(
                &den,
                EventPayload::Presence(PresenceChange {
                    kind: PresenceChangeKind::Joined,
                    session: session.clone(),
                }),
                t0(),
            )
            .await
            .unwrap();
    }
    let first_in_inbox = storage
        .append_event(
            &inbox,
            EventPayload::Interaction(interaction("u2", "u1", InteractionKind::Wave, t0())),
            t0(),
        )
        .await
        .unwrap();

    assert_eq!(first_in_inbox.seq, 1);
    assert_eq!(storage.latest_seq(&den).await.unwrap(), 3);
    assert_eq!(storage.latest_seq(&Scope::user("nobody")).await.unwrap(), 0);

    let replay = storage.events_since(&den, 1, 100).await.unwrap();
    assert_eq!(replay.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(replay[0].scope, den);
    assert_eq!(replay[0].published_at, t0());

    let page = storage.events_since(&den, 0, 2).await.unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn chat_rows_share_the_event_sequence() {
    let (storage, _dir) = setup().await;
    let scope = Scope::location("den");

    let mut ids = Vec::new();
    for n in 0..3 {
        let msg = ChatMessage::new(
            "den",
            None,
            Some("u1".into()),
            format!("hello {n}"),
            MessageKind::Chat,
            t0(),
        );
        let env = storage
            .append_event(&scope, EventPayload::Chat(msg), t0())
            .await
            .unwrap();
        match env.payload {
            EventPayload::Chat(stored) => {
                assert_eq!(stored.seq, env.seq);
                ids.push(stored.id);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    let (deleted, changed) = storage
        .moderate_chat_message(&ids[1], &Moderation::SoftDelete)
        .await
        .unwrap()
        .unwrap();
    assert!(changed && deleted.deleted);
    let (_, changed) = storage
        .moderate_chat_message(&ids[1], &Moderation::SoftDelete)
        .await
        .unwrap()
        .unwrap();
    assert!(!changed);

    let visible = storage.chat_messages_since(&scope, 0, 100).await.unwrap();
    assert_eq!(visible.iter().map(|m| m.seq).collect::<Vec<_>>(), vec![1, 3]);

    let (flagged, _) = storage
        .moderate_chat_message(
            &ids[2],
            &Moderation::Flag {
                reason: "spam".into(),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(flagged.flagged);
    assert_eq!(flagged.flag_reason.as_deref(), Some("spam"));
    assert!(
        storage
            .moderate_chat_message("missing", &Moderation::SoftDelete)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn soft_delete_blanks_the_logged_event() {
    let (storage, _dir) = setup().await;
    let scope = Scope::room("den", "patio");
    let msg = ChatMessage::new(
        "den",
        Some("patio".into()),
        Some("u1".into()),
        "secret phone 555",
        MessageKind::Chat,
        t0(),
    );
    let env = storage
        .append_event(&scope, EventPayload::Chat(msg), t0())
        .await
        .unwrap();
    let EventPayload::Chat(stored) = env.payload else {
        panic!("expected a chat payload");
    };

    storage
        .moderate_chat_message(&stored.id, &Moderation::SoftDelete)
        .await
        .unwrap()
        .unwrap();

    let events = storage.events_since(&scope, 0, 10).await.unwrap();
    assert_eq!(events.len(), 1);
    match &events[0].payload {
        EventPayload::Chat(replayed) => {
            assert_eq!(replayed.id, stored.id);
            assert_eq!(replayed.seq, env.seq);
            assert!(replayed.deleted);
            assert!(replayed.content.is_empty());
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn capped_interaction_insert_stops_at_limit() {
    let (storage, _dir) = setup().await;

    for _ in 0..2 {
        let ev = interaction("u1", "u2", InteractionKind::Message, t0());
        assert!(storage.insert_interaction_within_limit(&ev, 2).await.unwrap());
    }
    let over = interaction("u1", "u2", InteractionKind::Message, t0());
    assert!(!storage.insert_interaction_within_limit(&over, 2).await.unwrap());
    assert!(storage.get_interaction(&over.id).await.unwrap().is_none());

    // Other kinds and other senders have their own budget.
    let wave = interaction("u1", "u2", InteractionKind::Wave, t0());
    assert!(storage.insert_interaction_within_limit(&wave, 2).await.unwrap());
    let other = interaction("u3", "u2", InteractionKind::Message, t0());
    assert!(storage.insert_interaction_within_limit(&other, 2).await.unwrap());

    assert_eq!(
        storage
            .count_unread_sent("u1", "den", InteractionKind::Message, t0())
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn interactions_read_and_expire() {
    let (storage, _dir) = setup().await;
    let older = interaction("u2", "u1", InteractionKind::Wink, t0());
    let newer = interaction("u3", "u1", InteractionKind::Message, t0() + Duration::minutes(1));
    storage.insert_interaction(&older).await.unwrap();
    storage.insert_interaction(&newer).await.unwrap();

    let inbox = storage.unread_interactions("u1", t0()).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].id, newer.id);
    assert_eq!(
        storage
            .count_unread_sent("u3", "den", InteractionKind::Message, t0())
            .await
            .unwrap(),
        1
    );

    let read = storage
        .mark_interaction_read(&older.id, t0())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.status, InteractionStatus::Read);
    assert_eq!(read.read_at, Some(t0()));
    let again = storage
        .mark_interaction_read(&older.id, t0() + Duration::hours(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.read_at, Some(t0()));
    assert!(
        storage
            .mark_interaction_read("missing", t0())
            .await
            .unwrap()
            .is_none()
    );

    let after_ttl = t0() + Duration::hours(25);
    assert!(storage.unread_interactions("u1", after_ttl).await.unwrap().is_empty());
    assert_eq!(storage.expire_interactions(after_ttl).await.unwrap(), 1);
    assert_eq!(storage.expire_interactions(after_ttl).await.unwrap(), 0);
    let expired = storage.get_interaction(&newer.id).await.unwrap().unwrap();
    assert_eq!(expired.status, InteractionStatus::Expired);
}

#[tokio::test]
async fn revoting_replaces_choice() {
    let (storage, _dir) = setup().await;
    let vote = |user: &str, option: &str| Vote {
        poll_id: "next-song".into(),
        location_id: "den".into(),
        user_id: user.into(),
        option: option.into(),
        cast_at: t0(),
    };

    storage.upsert_vote(&vote("u1", "disco")).await.unwrap();
    storage.upsert_vote(&vote("u2", "disco")).await.unwrap();
    storage.upsert_vote(&vote("u3", "punk")).await.unwrap();
    storage.upsert_vote(&vote("u2", "punk")).await.unwrap();
    storage.upsert_vote(&vote("u4", "punk")).await.unwrap();

    let tally = storage.tally_votes("next-song").await.unwrap();
    assert_eq!(
        tally,
        vec![("punk".to_string(), 3), ("disco".to_string(), 1)]
    );
}

#[tokio::test]
async fn health_check_and_close() {
    let (storage, _dir) = setup().await;
    storage.health_check().await.unwrap();
    storage.close().await.unwrap();
}
