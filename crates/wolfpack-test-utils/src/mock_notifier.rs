// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock push collaborator that captures every hand-off, optionally failing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wolfpack_core::traits::Notification;
use wolfpack_core::{PushNotifier, WolfpackError};

pub struct MockNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    fail: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `notify` call return an error.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Captured `(user_id, notification)` pairs, in order.
    pub async fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushNotifier for MockNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), WolfpackError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(WolfpackError::Internal("push gateway unavailable".into()));
        }
        self.sent
            .lock()
            .await
            .push((user_id.to_string(), notification));
        Ok(())
    }
}
