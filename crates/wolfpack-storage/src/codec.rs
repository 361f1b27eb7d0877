// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite columns and the typed domain structs.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use wolfpack_core::types::{
    ChatMessage, Coordinates, InteractionEvent, Location, MembershipSession, Position, Profile,
};

/// Timestamps are stored as fixed-width UTC strings (microsecond precision,
/// `Z` suffix) so that `<` on TEXT is chronological.
pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

pub fn opt_ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_err(idx, e))
    })
    .transpose()
}

/// Parse a strum-backed enum column.
pub fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_err(idx, e))
}

pub fn json_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

pub const LOCATION_COLUMNS: &str = "id, name, latitude, longitude, radius_meters";

pub fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        center: Coordinates::new(row.get(2)?, row.get(3)?),
        radius_meters: row.get(4)?,
    })
}

pub const SESSION_COLUMNS: &str = "id, user_id, location_id, status, joined_at, last_activity_at, \
     display_name, avatar_url, vibe, table_label, position_x, position_y, version";

pub fn session_from_row(row: &Row<'_>) -> rusqlite::Result<MembershipSession> {
    let x: Option<f64> = row.get(10)?;
    let y: Option<f64> = row.get(11)?;
    Ok(MembershipSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        location_id: row.get(2)?,
        status: enum_at(row, 3)?,
        joined_at: ts_at(row, 4)?,
        last_activity_at: ts_at(row, 5)?,
        profile: Profile {
            display_name: row.get(6)?,
            avatar_url: row.get(7)?,
            vibe: row.get(8)?,
            table_label: row.get(9)?,
        },
        position: match (x, y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        },
        version: row.get(12)?,
    })
}

pub const INTERACTION_COLUMNS: &str = "id, sender_id, receiver_id, kind, location_id, payload, \
     status, created_at, read_at, expires_at";

pub fn interaction_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionEvent> {
    Ok(InteractionEvent {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        kind: enum_at(row, 3)?,
        location_id: row.get(4)?,
        payload: row.get(5)?,
        status: enum_at(row, 6)?,
        created_at: ts_at(row, 7)?,
        read_at: opt_ts_at(row, 8)?,
        expires_at: opt_ts_at(row, 9)?,
    })
}

pub const CHAT_COLUMNS: &str = "id, location_id, room, author_id, content, kind, seq, created_at, \
     deleted, flagged, flag_reason";

pub fn chat_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        location_id: row.get(1)?,
        room: row.get(2)?,
        author_id: row.get(3)?,
        content: row.get(4)?,
        kind: enum_at(row, 5)?,
        seq: row.get(6)?,
        created_at: ts_at(row, 7)?,
        deleted: row.get(8)?,
        flagged: row.get(9)?,
        flag_reason: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_fixed_width_and_sortable() {
        let a = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let c = a + chrono::Duration::hours(12);
        let (fa, fb, fc) = (fmt_ts(a), fmt_ts(b), fmt_ts(c));
        assert_eq!(fa, "2026-03-01T09:05:00.000000Z");
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb && fb < fc);
    }
}
