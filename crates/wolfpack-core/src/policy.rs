// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access policy vocabulary: actions, evaluation context, and decisions.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::types::InteractionKind;

/// An action a caller wants to perform at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "kind", rename_all = "snake_case")]
pub enum Action {
    Order,
    Message,
    Vote,
    Broadcast,
    /// A directed non-message interaction (wink, wave, drink offer).
    Interact(InteractionKind),
}

impl Action {
    /// Action that governs recording an interaction of the given kind.
    pub fn for_interaction(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Message => Action::Message,
            other => Action::Interact(other),
        }
    }

    /// Interaction kind checked against compatibility rules for directed actions.
    pub fn interaction_kind(&self) -> Option<InteractionKind> {
        match self {
            Action::Message => Some(InteractionKind::Message),
            Action::Interact(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Extra inputs for a policy evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyContext {
    /// Receiver of a directed interaction.
    #[serde(default)]
    pub target_user_id: Option<String>,
    /// Catalog item identifiers referenced by an order intent.
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl PolicyContext {
    pub fn directed_at(user_id: impl Into<String>) -> Self {
        Self {
            target_user_id: Some(user_id.into()),
            item_ids: Vec::new(),
        }
    }

    pub fn order_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_user_id: None,
            item_ids: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Machine-checkable reason for a denial.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No active membership session at the location.
    NotAMember,
    /// The caller's role does not meet the action's minimum.
    InsufficientRole,
    /// Ordering requires an open tab.
    NoOpenTab,
    /// The receiver has no active session at the location.
    RecipientNotPresent,
    /// Directed interactions at oneself are rejected.
    SelfInteraction,
    /// Compatibility rules forbid this sender -> receiver kind.
    IncompatibleInteraction,
    /// Too many outstanding unresolved requests.
    RateLimited,
    /// An ordered item is not currently orderable.
    ItemUnavailable,
}

/// Result of a policy evaluation. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Convert a denial into a `Forbidden` error.
    pub fn into_result(self) -> Result<(), crate::WolfpackError> {
        match self.reason {
            Some(reason) if !self.allowed => Err(crate::WolfpackError::forbidden(reason)),
            _ => Ok(()),
        }
    }
}
