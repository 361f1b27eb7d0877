// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message reads and moderation. Inserts happen in
//! [`events::append`](super::events::append) so that a message and its event
//! share one sequence number.

use rusqlite::{OptionalExtension, Transaction, params};
use wolfpack_core::WolfpackError;
use wolfpack_core::events::{EventPayload, Scope};
use wolfpack_core::types::{ChatMessage, Moderation};

use crate::codec::{CHAT_COLUMNS, chat_from_row, json_err};
use crate::database::{Database, map_tr_err};

pub async fn get(db: &Database, id: &str) -> Result<Option<ChatMessage>, WolfpackError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CHAT_COLUMNS} FROM chat_messages WHERE id = ?1"),
                params![id],
                chat_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Visible messages in `scope` after `after_seq`, ascending.
pub async fn since(
    db: &Database,
    scope: &Scope,
    after_seq: i64,
    limit: usize,
) -> Result<Vec<ChatMessage>, WolfpackError> {
    let key = scope.key();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHAT_COLUMNS} FROM chat_messages
                 WHERE scope = ?1 AND seq > ?2 AND deleted = 0
                 ORDER BY seq ASC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![key, after_seq, limit], chat_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply `action`. Soft deletes are one-way and also blank the message in
/// the event log, so replays never serve deleted content. Flagging an
/// already flagged message keeps the first reason.
pub async fn moderate(
    db: &Database,
    id: &str,
    action: &Moderation,
) -> Result<Option<(ChatMessage, bool)>, WolfpackError> {
    let id = id.to_string();
    let action = action.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = match &action {
                Moderation::SoftDelete => tx.execute(
                    "UPDATE chat_messages SET deleted = 1 WHERE id = ?1 AND deleted = 0",
                    params![id],
                )?,
                Moderation::Flag { reason } => tx.execute(
                    "UPDATE chat_messages SET flagged = 1, flag_reason = ?2
                     WHERE id = ?1 AND flagged = 0",
                    params![id, reason],
                )?,
            };
            let row = tx
                .query_row(
                    &format!("SELECT {CHAT_COLUMNS} FROM chat_messages WHERE id = ?1"),
                    params![id],
                    chat_from_row,
                )
                .optional()?;
            if let (Moderation::SoftDelete, Some(msg)) = (&action, &row) {
                if changed > 0 {
                    redact_chat_event(&tx, msg)?;
                }
            }
            tx.commit()?;
            Ok(row.map(|msg| (msg, changed > 0)))
        })
        .await
        .map_err(map_tr_err)
}

/// Rewrite the logged chat event for `msg` with its content removed.
fn redact_chat_event(tx: &Transaction<'_>, msg: &ChatMessage) -> rusqlite::Result<()> {
    let mut redacted = msg.clone();
    redacted.content.clear();
    redacted.deleted = true;
    let json = serde_json::to_string(&EventPayload::Chat(redacted)).map_err(json_err)?;
    tx.execute(
        "UPDATE scope_events SET payload = ?1
         WHERE scope = (SELECT scope FROM chat_messages WHERE id = ?2) AND seq = ?3",
        params![json, msg.id, msg.seq],
    )?;
    Ok(())
}
