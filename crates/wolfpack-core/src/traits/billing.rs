// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing/tab and menu/catalog collaborators consumed by the access policy.
//!
//! The core never moves money and never learns menu structure; it only asks
//! yes/no questions and counts.

use async_trait::async_trait;

use crate::error::WolfpackError;

/// Financial preconditions for ordering.
#[async_trait]
pub trait TabProvider: Send + Sync {
    /// Whether the user has an open tab at the location.
    async fn has_open_tab(&self, user_id: &str, location_id: &str) -> Result<bool, WolfpackError>;

    /// Number of the user's order requests that are still unresolved.
    async fn pending_orders(&self, user_id: &str, location_id: &str)
    -> Result<u32, WolfpackError>;
}

/// Item availability for order intents.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Whether the catalog item can currently be ordered.
    async fn is_orderable(&self, item_id: &str) -> Result<bool, WolfpackError>;
}
