// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location reference data.

use rusqlite::{OptionalExtension, params};
use wolfpack_core::WolfpackError;
use wolfpack_core::types::Location;

use crate::codec::{LOCATION_COLUMNS, location_from_row};
use crate::database::{Database, map_tr_err};

/// Insert a location or replace its name and geometry.
pub async fn upsert_location(db: &Database, location: &Location) -> Result<(), WolfpackError> {
    let loc = location.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO locations (id, name, latitude, longitude, radius_meters)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     latitude = excluded.latitude,
                     longitude = excluded.longitude,
                     radius_meters = excluded.radius_meters",
                params![
                    loc.id,
                    loc.name,
                    loc.center.latitude,
                    loc.center.longitude,
                    loc.radius_meters,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_location(db: &Database, id: &str) -> Result<Option<Location>, WolfpackError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"),
                params![id],
                location_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_locations(db: &Database) -> Result<Vec<Location>, WolfpackError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY id"))?;
            let rows = stmt.query_map([], location_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
