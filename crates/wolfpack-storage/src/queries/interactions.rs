// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction ledger. Rows are never deleted; only `status` and `read_at`
//! change after insert.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use wolfpack_core::WolfpackError;
use wolfpack_core::types::{InteractionEvent, InteractionKind};

use crate::codec::{INTERACTION_COLUMNS, fmt_ts, interaction_from_row};
use crate::database::{Database, map_tr_err};

const INSERT_SQL: &str = "INSERT INTO interactions
     (id, sender_id, receiver_id, kind, location_id, payload, status,
      created_at, read_at, expires_at)
 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const COUNT_UNREAD_SENT_SQL: &str = "SELECT COUNT(*) FROM interactions
 WHERE sender_id = ?1 AND location_id = ?2 AND kind = ?3 AND status = 'sent'
   AND (expires_at IS NULL OR expires_at > ?4)";

fn insert_row(conn: &Connection, ev: &InteractionEvent) -> rusqlite::Result<()> {
    conn.execute(
        INSERT_SQL,
        params![
            ev.id,
            ev.sender_id,
            ev.receiver_id,
            ev.kind.as_ref(),
            ev.location_id,
            ev.payload,
            ev.status.as_ref(),
            fmt_ts(ev.created_at),
            ev.read_at.map(fmt_ts),
            ev.expires_at.map(fmt_ts),
        ],
    )?;
    Ok(())
}

pub async fn insert(db: &Database, event: &InteractionEvent) -> Result<(), WolfpackError> {
    let ev = event.clone();
    db.connection()
        .call(move |conn| Ok(insert_row(conn, &ev)?))
        .await
        .map_err(map_tr_err)
}

/// Insert `event` unless its sender already has `max_unread` unread,
/// unexpired interactions of the same kind at the location.
///
/// Count and insert share one transaction on the connection thread, so
/// concurrent senders cannot both slip under the limit. Returns whether
/// the row was written.
pub async fn insert_within_limit(
    db: &Database,
    event: &InteractionEvent,
    max_unread: u32,
) -> Result<bool, WolfpackError> {
    let ev = event.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let unread: i64 = tx.query_row(
                COUNT_UNREAD_SENT_SQL,
                params![
                    ev.sender_id,
                    ev.location_id,
                    ev.kind.as_ref(),
                    fmt_ts(ev.created_at)
                ],
                |row| row.get(0),
            )?;
            if unread >= i64::from(max_unread) {
                return Ok(false);
            }
            insert_row(&tx, &ev)?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<InteractionEvent>, WolfpackError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {INTERACTION_COLUMNS} FROM interactions WHERE id = ?1"),
                params![id],
                interaction_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Move a `sent` interaction to `read`; any other state is left alone.
pub async fn mark_read(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<Option<InteractionEvent>, WolfpackError> {
    let id = id.to_string();
    let at = fmt_ts(at);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE interactions SET status = 'read', read_at = ?2
                 WHERE id = ?1 AND status = 'sent'",
                params![id, at],
            )?;
            let row = tx
                .query_row(
                    &format!("SELECT {INTERACTION_COLUMNS} FROM interactions WHERE id = ?1"),
                    params![id],
                    interaction_from_row,
                )
                .optional()?;
            tx.commit()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

/// Unread, unexpired interactions addressed to `receiver_id`, newest first.
pub async fn unread_for(
    db: &Database,
    receiver_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<InteractionEvent>, WolfpackError> {
    let receiver_id = receiver_id.to_string();
    let now = fmt_ts(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INTERACTION_COLUMNS} FROM interactions
                 WHERE receiver_id = ?1 AND status = 'sent'
                   AND (expires_at IS NULL OR expires_at > ?2)
                 ORDER BY created_at DESC, id ASC"
            ))?;
            let rows = stmt.query_map(params![receiver_id, now], interaction_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Unread, unexpired interactions of `kind` sent by `sender_id` at a location.
pub async fn count_unread_sent(
    db: &Database,
    sender_id: &str,
    location_id: &str,
    kind: InteractionKind,
    now: DateTime<Utc>,
) -> Result<u32, WolfpackError> {
    let sender_id = sender_id.to_string();
    let location_id = location_id.to_string();
    let now = fmt_ts(now);
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                COUNT_UNREAD_SENT_SQL,
                params![sender_id, location_id, kind.as_ref(), now],
                |row| row.get(0),
            )?;
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
        .await
        .map_err(map_tr_err)
}

/// Mark `sent` interactions whose expiry is at or before `now` as `expired`.
pub async fn expire_due(db: &Database, now: DateTime<Utc>) -> Result<u64, WolfpackError> {
    let now = fmt_ts(now);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE interactions SET status = 'expired'
                 WHERE status = 'sent' AND expires_at IS NOT NULL AND expires_at <= ?1",
                params![now],
            )?;
            Ok(changed as u64)
        })
        .await
        .map_err(map_tr_err)
}
