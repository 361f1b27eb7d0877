// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-scope publish/subscribe backed by the persistent event log.
//!
//! Every scope gets a lazily created `tokio::sync::broadcast` channel plus a
//! publish lock. A publish holds the lock across "assign seq + persist" and the
//! in-process send, so fan-out order always equals sequence order.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use wolfpack_config::model::BusConfig;
use wolfpack_core::events::{Envelope, EventPayload, Scope};
use wolfpack_core::{Clock, PackStorage, WolfpackError};

use crate::subscription::Subscription;

struct ScopeChannel {
    sender: broadcast::Sender<Envelope>,
    publish_lock: Mutex<()>,
}

impl ScopeChannel {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            publish_lock: Mutex::new(()),
        }
    }
}

/// In-process scoped event bus.
///
/// Share it as `Arc<EventBus>`. Persistence happens before fan-out; a publish
/// with no subscribers still lands in the log and is replayable.
pub struct EventBus {
    storage: Arc<dyn PackStorage>,
    clock: Arc<dyn Clock>,
    channels: DashMap<String, Arc<ScopeChannel>>,
    capacity: usize,
    replay_page_size: usize,
}

impl EventBus {
    pub fn new(storage: Arc<dyn PackStorage>, clock: Arc<dyn Clock>, config: &BusConfig) -> Self {
        Self {
            storage,
            clock,
            channels: DashMap::new(),
            capacity: config.channel_capacity.max(1),
            replay_page_size: config.replay_page_size.max(1),
        }
    }

    fn channel(&self, scope: &Scope) -> Arc<ScopeChannel> {
        self.channels
            .entry(scope.key())
            .or_insert_with(|| Arc::new(ScopeChannel::new(self.capacity)))
            .clone()
    }

    /// Persist `payload` under the next sequence number in `scope`, then fan
    /// it out to live subscribers.
    pub async fn publish(
        &self,
        scope: &Scope,
        payload: EventPayload,
    ) -> Result<Envelope, WolfpackError> {
        let channel = self.channel(scope);
        let _guard = channel.publish_lock.lock().await;

        let envelope = self
            .storage
            .append_event(scope, payload, self.clock.now())
            .await?;

        // A send error only means nobody is listening right now.
        let receivers = channel.sender.send(envelope.clone()).unwrap_or(0);
        debug!(
            scope = %scope,
            seq = envelope.seq,
            event_type = %envelope.payload.event_type(),
            receivers,
            "event published"
        );
        Ok(envelope)
    }

    /// Live subscription: delivers events published after this call returns.
    pub async fn subscribe(&self, scope: &Scope) -> Result<Subscription, WolfpackError> {
        let receiver = self.channel(scope).sender.subscribe();
        let last_seq = self.storage.latest_seq(scope).await?;
        Ok(Subscription::new(
            scope.clone(),
            receiver,
            Arc::clone(&self.storage),
            last_seq,
            false,
            self.replay_page_size,
        ))
    }

    /// Replay every persisted event with `seq > after_seq`, then continue live
    /// without gaps or duplicates.
    pub fn subscribe_from(&self, scope: &Scope, after_seq: i64) -> Subscription {
        let receiver = self.channel(scope).sender.subscribe();
        Subscription::new(
            scope.clone(),
            receiver,
            Arc::clone(&self.storage),
            after_seq.max(0),
            true,
            self.replay_page_size,
        )
    }

    /// Persisted events after `after_seq`, for explicit client reconciliation.
    pub async fn fetch_since(
        &self,
        scope: &Scope,
        after_seq: i64,
        limit: usize,
    ) -> Result<Vec<Envelope>, WolfpackError> {
        self.storage.events_since(scope, after_seq, limit).await
    }

    /// Current live subscriber count for a scope.
    pub fn subscriber_count(&self, scope: &Scope) -> usize {
        self.channels
            .get(&scope.key())
            .map(|c| c.sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of scopes with a channel.
    pub fn scope_count(&self) -> usize {
        self.channels.len()
    }
}
