// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::{debug, info};
use wolfpack_config::model::StorageConfig;
use wolfpack_core::WolfpackError;

use crate::migrations;

/// Convert a tokio-rusqlite error into `WolfpackError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WolfpackError {
    WolfpackError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with default settings and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, WolfpackError> {
        Self::open_with(&StorageConfig {
            database_path: path.to_string(),
            ..StorageConfig::default()
        })
        .await
    }

    /// Open the database described by `config` and run pending migrations.
    pub async fn open_with(config: &StorageConfig) -> Result<Self, WolfpackError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WolfpackError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| WolfpackError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(config.wal_mode, config.busy_timeout_ms).await?;
        info!(path = %path, wal = config.wal_mode, "database opened");
        Ok(db)
    }

    /// In-memory database with the full schema. Used by tests and `doctor`.
    pub async fn open_in_memory() -> Result<Self, WolfpackError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| WolfpackError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false, 5_000).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool, busy_timeout_ms: u64) -> Result<(), WolfpackError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    let mode: String = conn
                        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| WolfpackError::Storage {
                source: Box::new(e),
            })?;
        Ok(())
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), WolfpackError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_schema_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/wolfpack.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();

        for table in [
            "chat_messages",
            "interactions",
            "locations",
            "membership_sessions",
            "scope_events",
            "votes",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
        assert!(path.exists());
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wolfpack.db");
        let path = path.to_str().unwrap();
        let db = Database::open(path).await.unwrap();
        db.checkpoint().await.unwrap();
        drop(db);
        Database::open(path).await.unwrap();
    }
}
