// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gap-free, duplicate-free delivery on top of a lossy broadcast receiver.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use wolfpack_core::events::{Envelope, Scope};
use wolfpack_core::{PackStorage, WolfpackError};

/// A subscriber's view of one scope.
///
/// Tracks the last delivered sequence number. Anything at or below it is
/// dropped; a jump past `last + 1` or a lagged receiver triggers a refill
/// from the persistent log. Dropping the subscription unsubscribes.
pub struct Subscription {
    scope: Scope,
    receiver: broadcast::Receiver<Envelope>,
    storage: Arc<dyn PackStorage>,
    last_seq: i64,
    backlog: VecDeque<Envelope>,
    catching_up: bool,
    page_size: usize,
}

impl Subscription {
    pub(crate) fn new(
        scope: Scope,
        receiver: broadcast::Receiver<Envelope>,
        storage: Arc<dyn PackStorage>,
        last_seq: i64,
        catching_up: bool,
        page_size: usize,
    ) -> Self {
        Self {
            scope,
            receiver,
            storage,
            last_seq,
            backlog: VecDeque::new(),
            catching_up,
            page_size,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Sequence number of the last delivered envelope.
    pub fn last_seq(&self) -> i64 {
        self.last_seq
    }

    /// Next envelope in sequence order. `Ok(None)` once the bus is gone.
    pub async fn recv(&mut self) -> Result<Option<Envelope>, WolfpackError> {
        loop {
            if let Some(envelope) = self.backlog.pop_front() {
                if envelope.seq > self.last_seq {
                    self.last_seq = envelope.seq;
                    return Ok(Some(envelope));
                }
                continue;
            }

            if self.catching_up {
                let page = self
                    .storage
                    .events_since(&self.scope, self.last_seq, self.page_size)
                    .await?;
                if page.len() < self.page_size {
                    self.catching_up = false;
                }
                self.backlog.extend(page);
                continue;
            }

            match self.receiver.recv().await {
                Ok(envelope) if envelope.seq <= self.last_seq => {}
                Ok(envelope) if envelope.seq == self.last_seq + 1 => {
                    self.last_seq = envelope.seq;
                    return Ok(Some(envelope));
                }
                Ok(envelope) => {
                    debug!(
                        scope = %self.scope,
                        expected = self.last_seq + 1,
                        got = envelope.seq,
                        "sequence gap, refilling from log"
                    );
                    self.catching_up = true;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(scope = %self.scope, skipped, "subscriber lagged, refilling from log");
                    self.catching_up = true;
                }
                Err(RecvError::Closed) => return Ok(None),
            }
        }
    }

    /// Turn the subscription into a stream. The stream ends after the bus
    /// closes or after the first storage error is yielded.
    pub fn into_stream(self) -> impl Stream<Item = Result<Envelope, WolfpackError>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut sub = state?;
            match sub.recv().await {
                Ok(Some(envelope)) => Some((Ok(envelope), Some(sub))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
