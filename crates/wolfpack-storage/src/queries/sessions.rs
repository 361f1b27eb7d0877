// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Membership session lifecycle queries.
//!
//! Every transition is a single statement guarded by `status = 'active'`, so
//! concurrent callers can never move a session out of a terminal state.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use wolfpack_core::WolfpackError;
use wolfpack_core::traits::AdmitOutcome;
use wolfpack_core::types::{MembershipSession, Position, ProfileUpdate};

use crate::codec::{SESSION_COLUMNS, fmt_ts, session_from_row};
use crate::database::{Database, map_tr_err};

/// Insert `candidate` as the active session for its (user, location) pair, or
/// refresh the existing active session's `last_activity_at`.
///
/// Relies on the partial unique index `idx_sessions_one_active`, so two
/// concurrent admissions of the same pair resolve to one row.
pub async fn admit(
    db: &Database,
    candidate: &MembershipSession,
) -> Result<AdmitOutcome, WolfpackError> {
    let c = candidate.clone();
    db.connection()
        .call(move |conn| {
            let session = conn.query_row(
                &format!(
                    "INSERT INTO membership_sessions
                         (id, user_id, location_id, status, joined_at, last_activity_at, version)
                     VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?6)
                     ON CONFLICT(user_id, location_id) WHERE status = 'active'
                     DO UPDATE SET last_activity_at = excluded.last_activity_at
                     RETURNING {SESSION_COLUMNS}"
                ),
                params![
                    c.id,
                    c.user_id,
                    c.location_id,
                    fmt_ts(c.joined_at),
                    fmt_ts(c.last_activity_at),
                    c.version,
                ],
                session_from_row,
            )?;
            let created = session.id == c.id;
            Ok(AdmitOutcome { session, created })
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<MembershipSession>, WolfpackError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM membership_sessions WHERE id = ?1"),
                params![id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_active(
    db: &Database,
    user_id: &str,
    location_id: &str,
) -> Result<Option<MembershipSession>, WolfpackError> {
    let user_id = user_id.to_string();
    let location_id = location_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM membership_sessions
                     WHERE user_id = ?1 AND location_id = ?2 AND status = 'active'"
                ),
                params![user_id, location_id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Heartbeat. Returns whether an active session was touched.
pub async fn touch(db: &Database, id: &str, at: DateTime<Utc>) -> Result<bool, WolfpackError> {
    let id = id.to_string();
    let at = fmt_ts(at);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE membership_sessions SET last_activity_at = ?2
                 WHERE id = ?1 AND status = 'active'",
                params![id, at],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition an active session to `left`.
pub async fn leave(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<Option<MembershipSession>, WolfpackError> {
    let id = id.to_string();
    let at = fmt_ts(at);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE membership_sessions
                     SET status = 'left', last_activity_at = ?2, version = version + 1
                     WHERE id = ?1 AND status = 'active'
                     RETURNING {SESSION_COLUMNS}"
                ),
                params![id, at],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply profile and position changes to an active session.
pub async fn update_presence(
    db: &Database,
    id: &str,
    profile: &ProfileUpdate,
    position: Option<Position>,
    at: DateTime<Utc>,
) -> Result<Option<MembershipSession>, WolfpackError> {
    let id = id.to_string();
    let p = profile.clone();
    let (x, y) = match position {
        Some(pos) => (Some(pos.x), Some(pos.y)),
        None => (None, None),
    };
    let at = fmt_ts(at);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE membership_sessions SET
                         display_name = COALESCE(?2, display_name),
                         avatar_url = COALESCE(?3, avatar_url),
                         vibe = COALESCE(?4, vibe),
                         table_label = COALESCE(?5, table_label),
                         position_x = COALESCE(?6, position_x),
                         position_y = COALESCE(?7, position_y),
                         last_activity_at = ?8,
                         version = version + 1
                     WHERE id = ?1 AND status = 'active'
                     RETURNING {SESSION_COLUMNS}"
                ),
                params![
                    id,
                    p.display_name,
                    p.avatar_url,
                    p.vibe,
                    p.table_label,
                    x,
                    y,
                    at
                ],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Expire every active session idle since before `cutoff`, returning exactly
/// the rows this call transitioned.
pub async fn expire_idle(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<MembershipSession>, WolfpackError> {
    let cutoff = fmt_ts(cutoff);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE membership_sessions
                 SET status = 'expired', version = version + 1
                 WHERE status = 'active' AND last_activity_at < ?1
                 RETURNING {SESSION_COLUMNS}"
            ))?;
            let rows = stmt.query_map(params![cutoff], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Active sessions at a location, most recently joined first, ties by id.
pub async fn list_active(
    db: &Database,
    location_id: &str,
) -> Result<Vec<MembershipSession>, WolfpackError> {
    let location_id = location_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM membership_sessions
                 WHERE location_id = ?1 AND status = 'active'
                 ORDER BY joined_at DESC, id ASC"
            ))?;
            let rows = stmt.query_map(params![location_id], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
