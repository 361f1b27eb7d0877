// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push-notification hand-off. Delivery success is outside this core's guarantees.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WolfpackError;

/// A "this user should be notified" signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Event name, e.g. `interaction.wink`.
    pub event_type: String,
    pub title: String,
    pub body: Option<String>,
    /// Id of the entity that triggered the notification.
    pub reference_id: String,
}

#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), WolfpackError>;
}
