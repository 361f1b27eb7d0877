// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequenced per-scope event log.
//!
//! Sequence numbers are `MAX(seq) + 1` within the scope, assigned inside the
//! same transaction that persists the event (and, for chat payloads, the chat
//! row). The `(scope, seq)` primary key rejects any duplicate assignment.

use chrono::{DateTime, Utc};
use rusqlite::{Transaction, params};
use wolfpack_core::WolfpackError;
use wolfpack_core::events::{Envelope, EventPayload, Scope};
use wolfpack_core::types::ChatMessage;

use crate::codec::{fmt_ts, json_err, ts_at};
use crate::database::{Database, map_tr_err};

/// Persist `payload` under the next sequence number in `scope`.
pub async fn append(
    db: &Database,
    scope: &Scope,
    payload: EventPayload,
    at: DateTime<Utc>,
) -> Result<Envelope, WolfpackError> {
    let scope = scope.clone();
    db.connection()
        .call(move |conn| {
            let key = scope.key();
            let tx = conn.transaction()?;
            let seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM scope_events WHERE scope = ?1",
                params![key],
                |row| row.get(0),
            )?;

            let mut payload = payload;
            if let EventPayload::Chat(msg) = &mut payload {
                msg.seq = seq;
                insert_chat_row(&tx, &key, msg)?;
            }

            let json = serde_json::to_string(&payload).map_err(json_err)?;
            tx.execute(
                "INSERT INTO scope_events (scope, seq, event_type, payload, published_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key, seq, payload.event_type(), json, fmt_ts(at)],
            )?;
            tx.commit()?;

            Ok(Envelope {
                scope,
                seq,
                payload,
                published_at: at,
            })
        })
        .await
        .map_err(map_tr_err)
}

fn insert_chat_row(tx: &Transaction<'_>, scope_key: &str, msg: &ChatMessage) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO chat_messages
             (id, scope, seq, location_id, room, author_id, content, kind, created_at,
              deleted, flagged, flag_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            msg.id,
            scope_key,
            msg.seq,
            msg.location_id,
            msg.room,
            msg.author_id,
            msg.content,
            msg.kind.as_ref(),
            fmt_ts(msg.created_at),
            msg.deleted,
            msg.flagged,
            msg.flag_reason,
        ],
    )?;
    Ok(())
}

/// Events in `scope` with `seq > after_seq`, ascending, at most `limit`.
pub async fn since(
    db: &Database,
    scope: &Scope,
    after_seq: i64,
    limit: usize,
) -> Result<Vec<Envelope>, WolfpackError> {
    let scope = scope.clone();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT seq, payload, published_at FROM scope_events
                 WHERE scope = ?1 AND seq > ?2
                 ORDER BY seq ASC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![scope.key(), after_seq, limit], |row| {
                let raw: String = row.get(1)?;
                let payload: EventPayload = serde_json::from_str(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(Envelope {
                    scope: scope.clone(),
                    seq: row.get(0)?,
                    payload,
                    published_at: ts_at(row, 2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Highest sequence number assigned in `scope`, 0 if none.
pub async fn latest_seq(db: &Database, scope: &Scope) -> Result<i64, WolfpackError> {
    let key = scope.key();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COALESCE(MAX(seq), 0) FROM scope_events WHERE scope = ?1",
                params![key],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
