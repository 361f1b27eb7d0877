// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Wolfpack membership and presence core.

use thiserror::Error;

use crate::policy::DenyReason;

/// The primary error type returned by every Wolfpack operation.
///
/// Every variant is local to a single request. None of them is fatal to the
/// process; callers re-prompt, re-admit, or retry.
#[derive(Debug, Error)]
pub enum WolfpackError {
    /// The reported coordinates are outside the venue's admission radius.
    #[error("out of range: {distance_meters:.1}m from venue, radius is {radius_meters:.1}m")]
    OutOfRange {
        distance_meters: f64,
        radius_meters: f64,
    },

    /// No location is registered under the given id.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The membership session does not exist (or is not active, for operations
    /// that require an active session).
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// No interaction is recorded under the given id.
    #[error("interaction not found: {0}")]
    InteractionNotFound(String),

    /// No chat message is recorded under the given id.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// The access policy denied the action.
    #[error("forbidden: {reason}")]
    Forbidden { reason: DenyReason },

    /// Storage backend errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WolfpackError {
    /// Shorthand for a policy denial.
    pub fn forbidden(reason: DenyReason) -> Self {
        Self::Forbidden { reason }
    }

    /// Returns the denial reason when this error is a policy denial.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Forbidden { reason } => Some(*reason),
            _ => None,
        }
    }
}
