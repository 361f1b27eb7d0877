// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical typed entities shared across storage, bus, and service boundaries.
//!
//! Rows are mapped into these structs at the storage boundary; nothing else in
//! the workspace passes untyped rows around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and within WGS-84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A venue with a registered center point and admission radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub center: Coordinates,
    /// Admission radius in meters.
    pub radius_meters: f64,
}

/// Lifecycle state of a membership session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Expired,
    Left,
}

/// Ephemeral profile fields a member shows while checked in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Free-text current status ("vibe").
    pub vibe: Option<String>,
    /// Table or seat label.
    pub table_label: Option<String>,
}

/// Partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub vibe: Option<String>,
    #[serde(default)]
    pub table_label: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.vibe.is_none()
            && self.table_label.is_none()
    }

    /// Apply this update on top of an existing profile.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(v) = &self.display_name {
            profile.display_name = Some(v.clone());
        }
        if let Some(v) = &self.avatar_url {
            profile.avatar_url = Some(v.clone());
        }
        if let Some(v) = &self.vibe {
            profile.vibe = Some(v.clone());
        }
        if let Some(v) = &self.table_label {
            profile.table_label = Some(v.clone());
        }
    }
}

/// Coarse position inside the venue, used for UI placement only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One user checked in at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipSession {
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub status: SessionStatus,
    pub joined_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub profile: Profile,
    pub position: Option<Position>,
    /// Incremented on every presence-visible mutation. Heartbeats do not bump it.
    pub version: i64,
}

impl MembershipSession {
    /// Build a fresh active session for admission.
    pub fn new_active(
        user_id: impl Into<String>,
        location_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            location_id: location_id.into(),
            status: SessionStatus::Active,
            joined_at: now,
            last_activity_at: now,
            profile: Profile::default(),
            position: None,
            version: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Classification supplied by the identity collaborator.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Dj,
    Bartender,
    Admin,
}

impl Role {
    /// Staff roles bypass the membership check.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Dj | Role::Bartender | Role::Admin)
    }
}

/// Declared gender used by compatibility rules.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    #[default]
    Unspecified,
}

/// Attributes consulted by compatibility rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAttributes {
    pub gender: Gender,
}

/// An authenticated caller as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub attributes: MemberAttributes,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn member(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Member,
            attributes: MemberAttributes::default(),
            display_name: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.attributes.gender = gender;
        self
    }
}

/// Kind of a directed interaction between two members.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Wink,
    Wave,
    Message,
    DrinkOffer,
}

impl InteractionKind {
    /// Kinds that are also announced on the location-wide scope.
    pub fn is_presence_visible(&self) -> bool {
        matches!(self, InteractionKind::Wink | InteractionKind::Wave)
    }
}

/// Delivery state of an interaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Sent,
    Read,
    Expired,
}

/// A directed interaction from one member to another. Append-only apart from
/// `status` and `read_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub kind: InteractionKind,
    pub location_id: String,
    pub payload: Option<String>,
    pub status: InteractionStatus,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InteractionEvent {
    /// Whether the interaction should still be surfaced as new at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.status == InteractionStatus::Sent && self.expires_at.is_none_or(|exp| exp > now)
    }
}

/// Kind of a scoped chat record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Chat,
    Broadcast,
    System,
}

/// A chat message or broadcast within a location or room scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub location_id: String,
    pub room: Option<String>,
    /// `None` for system and console broadcasts.
    pub author_id: Option<String>,
    pub content: String,
    pub kind: MessageKind,
    /// Scope sequence number, assigned when the message is persisted.
    pub seq: i64,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub flagged: bool,
    pub flag_reason: Option<String>,
}

impl ChatMessage {
    pub fn new(
        location_id: impl Into<String>,
        room: Option<String>,
        author_id: Option<String>,
        content: impl Into<String>,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            location_id: location_id.into(),
            room,
            author_id,
            content: content.into(),
            kind,
            seq: 0,
            created_at: now,
            deleted: false,
            flagged: false,
            flag_reason: None,
        }
    }
}

/// Moderation action on a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Moderation {
    SoftDelete,
    Flag { reason: String },
}

/// A vote cast in a DJ poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub poll_id: String,
    pub location_id: String,
    pub user_id: String,
    pub option: String,
    pub cast_at: DateTime<Utc>,
}

/// Generate a new opaque identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
