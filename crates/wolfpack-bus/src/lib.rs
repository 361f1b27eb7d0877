// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped event bus for the Wolfpack presence service.
//!
//! Scopes are `location:<id>`, `room:<location>:<room>`, and `user:<id>`.
//! Each publish is persisted with a per-scope sequence number before it is
//! fanned out, so subscribers can resume from any sequence number and observe
//! every event exactly once, in order.

pub mod bus;
pub mod subscription;

pub use bus::EventBus;
pub use subscription::Subscription;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use wolfpack_config::model::BusConfig;
    use wolfpack_core::events::{EventPayload, Scope};
    use wolfpack_core::types::Vote;
    use wolfpack_core::{ManualClock, PackStorage};
    use wolfpack_storage::{Database, SqliteStorage};

    use super::*;

    async fn bus_with(config: BusConfig) -> (Arc<EventBus>, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::new(Database::open_in_memory().await.unwrap()));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 21, 0, 0).unwrap(),
        ));
        let bus = Arc::new(EventBus::new(storage.clone(), clock, &config));
        (bus, storage)
    }

    async fn bus() -> (Arc<EventBus>, Arc<SqliteStorage>) {
        bus_with(BusConfig::default()).await
    }

    fn vote(n: usize) -> EventPayload {
        EventPayload::VoteCast(Vote {
            poll_id: "poll".into(),
            location_id: "den".into(),
            user_id: format!("u{n}"),
            option: "disco".into(),
            cast_at: Utc.with_ymd_and_hms(2026, 5, 1, 21, 0, 0).unwrap(),
        })
    }

    async fn next_seq(sub: &mut Subscription) -> i64 {
        tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("timed out waiting for event")
            .unwrap()
            .expect("bus closed")
            .seq
    }

    #[tokio::test]
    async fn publish_assigns_consecutive_sequence_numbers() {
        let (bus, storage) = bus().await;
        let scope = Scope::location("den");
        for expected in 1..=3 {
            let env = bus.publish(&scope, vote(0)).await.unwrap();
            assert_eq!(env.seq, expected);
        }
        assert_eq!(storage.latest_seq(&scope).await.unwrap(), 3);
        let other = bus.publish(&Scope::location("other"), vote(0)).await.unwrap();
        assert_eq!(other.seq, 1);
    }

    #[tokio::test]
    async fn subscribers_observe_same_order() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        let mut a = bus.subscribe(&scope).await.unwrap();
        let mut b = bus.subscribe(&scope).await.unwrap();
        assert_eq!(bus.subscriber_count(&scope), 2);

        let publishers: Vec<_> = (0..20)
            .map(|n| {
                let bus = bus.clone();
                let scope = scope.clone();
                tokio::spawn(async move { bus.publish(&scope, vote(n)).await.unwrap() })
            })
            .collect();
        for p in publishers {
            p.await.unwrap();
        }

        let mut seen_a = Vec::new();
        let mut seen_b = Vec::new();
        for _ in 0..20 {
            seen_a.push(next_seq(&mut a).await);
            seen_b.push(next_seq(&mut b).await);
        }
        assert_eq!(seen_a, (1..=20).collect::<Vec<_>>());
        assert_eq!(seen_a, seen_b);
    }

    #[tokio::test]
    async fn live_subscription_skips_history() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        bus.publish(&scope, vote(1)).await.unwrap();

        let mut sub = bus.subscribe(&scope).await.unwrap();
        assert_eq!(sub.last_seq(), 1);
        bus.publish(&scope, vote(2)).await.unwrap();
        assert_eq!(next_seq(&mut sub).await, 2);
    }

    #[tokio::test]
    async fn replay_from_four_then_live() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        for n in 0..6 {
            bus.publish(&scope, vote(n)).await.unwrap();
        }

        let mut sub = bus.subscribe_from(&scope, 4);
        assert_eq!(next_seq(&mut sub).await, 5);
        assert_eq!(next_seq(&mut sub).await, 6);

        bus.publish(&scope, vote(7)).await.unwrap();
        assert_eq!(next_seq(&mut sub).await, 7);
    }

    #[tokio::test]
    async fn replay_pages_through_long_backlog() {
        let (bus, _storage) = bus_with(BusConfig {
            channel_capacity: 8,
            replay_page_size: 3,
        })
        .await;
        let scope = Scope::room("den", "dancefloor");
        for n in 0..10 {
            bus.publish(&scope, vote(n)).await.unwrap();
        }

        let mut sub = bus.subscribe_from(&scope, 0);
        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(next_seq(&mut sub).await);
        }
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn lagged_subscriber_refills_from_log() {
        let (bus, _storage) = bus_with(BusConfig {
            channel_capacity: 2,
            replay_page_size: 500,
        })
        .await;
        let scope = Scope::user("u1");
        let mut sub = bus.subscribe(&scope).await.unwrap();
        for n in 0..10 {
            bus.publish(&scope, vote(n)).await.unwrap();
        }

        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(next_seq(&mut sub).await);
        }
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_persisted() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        bus.publish(&scope, vote(1)).await.unwrap();
        let fetched = bus.fetch_since(&scope, 0, 10).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].payload, vote(1));
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        let sub = bus.subscribe(&scope).await.unwrap();
        assert_eq!(bus.subscriber_count(&scope), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(&scope), 0);
        bus.publish(&scope, vote(1)).await.unwrap();
    }

    #[tokio::test]
    async fn subscription_as_stream() {
        let (bus, _storage) = bus().await;
        let scope = Scope::location("den");
        for n in 0..3 {
            bus.publish(&scope, vote(n)).await.unwrap();
        }
        let stream = bus.subscribe_from(&scope, 0).into_stream();
        let seqs: Vec<i64> = stream
            .take(3)
            .map(|r| r.unwrap().seq)
            .collect()
            .await;
        assert_eq!(seqs, vec![1, 2, 3]);
    }
}
