// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DJ poll votes.

use rusqlite::params;
use wolfpack_core::WolfpackError;
use wolfpack_core::types::Vote;

use crate::codec::fmt_ts;
use crate::database::{Database, map_tr_err};

/// Record a vote; a second vote by the same user in the same poll replaces the first.
pub async fn upsert(db: &Database, vote: &Vote) -> Result<(), WolfpackError> {
    let v = vote.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO votes (poll_id, user_id, location_id, choice, cast_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(poll_id, user_id) DO UPDATE SET
                     choice = excluded.choice,
                     location_id = excluded.location_id,
                     cast_at = excluded.cast_at",
                params![v.poll_id, v.user_id, v.location_id, v.option, fmt_ts(v.cast_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Counts per choice, highest first, ties alphabetical.
pub async fn tally(db: &Database, poll_id: &str) -> Result<Vec<(String, u64)>, WolfpackError> {
    let poll_id = poll_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT choice, COUNT(*) AS n FROM votes
                 WHERE poll_id = ?1
                 GROUP BY choice
                 ORDER BY n DESC, choice ASC",
            )?;
            let rows = stmt.query_map(params![poll_id], |row| {
                let n: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, n.max(0) as u64))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
