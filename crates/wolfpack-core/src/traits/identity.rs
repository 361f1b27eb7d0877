// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity collaborator. The core trusts the ids and role claims it returns.

use async_trait::async_trait;

use crate::error::WolfpackError;
use crate::types::Identity;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer credential into an identity. `None` means unauthenticated.
    async fn authenticate(&self, token: &str) -> Result<Option<Identity>, WolfpackError>;

    /// Look up another user's identity (for compatibility attributes).
    async fn lookup(&self, user_id: &str) -> Result<Option<Identity>, WolfpackError>;
}
