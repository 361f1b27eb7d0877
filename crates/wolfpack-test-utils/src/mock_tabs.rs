// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock billing collaborator.
//!
//! Tabs are open unless closed explicitly; pending order counts are set per user.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wolfpack_core::{TabProvider, WolfpackError};

pub struct MockTabs {
    closed: Mutex<HashSet<String>>,
    pending: Mutex<HashMap<String, u32>>,
}

impl MockTabs {
    pub fn new() -> Self {
        Self {
            closed: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub async fn close_tab(&self, user_id: &str) {
        self.closed.lock().await.insert(user_id.to_string());
    }

    pub async fn open_tab(&self, user_id: &str) {
        self.closed.lock().await.remove(user_id);
    }

    pub async fn set_pending_orders(&self, user_id: &str, count: u32) {
        self.pending.lock().await.insert(user_id.to_string(), count);
    }
}

impl Default for MockTabs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TabProvider for MockTabs {
    async fn has_open_tab(&self, user_id: &str, _location_id: &str) -> Result<bool, WolfpackError> {
        Ok(!self.closed.lock().await.contains(user_id))
    }

    async fn pending_orders(&self, user_id: &str, _location_id: &str) -> Result<u32, WolfpackError> {
        Ok(self.pending.lock().await.get(user_id).copied().unwrap_or(0))
    }
}
