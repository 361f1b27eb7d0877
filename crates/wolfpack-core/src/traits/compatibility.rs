// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable sender -> receiver compatibility rules for directed interactions.

use crate::types::{InteractionKind, MemberAttributes};

/// Decides whether a sender may direct an interaction kind at a receiver.
///
/// Implementations are swappable without touching the access policy's control flow.
pub trait CompatibilityRules: Send + Sync {
    fn permits(
        &self,
        sender: &MemberAttributes,
        receiver: &MemberAttributes,
        kind: InteractionKind,
    ) -> bool;
}

/// Rules that permit everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl CompatibilityRules for PermitAll {
    fn permits(&self, _: &MemberAttributes, _: &MemberAttributes, _: InteractionKind) -> bool {
        true
    }
}
