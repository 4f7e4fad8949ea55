//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `tick_metrics`, `vehicle_snapshots`, and `order_log`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OrderLogRow, OutputResult, TickMetricsRow, VehicleSnapshotRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS tick_metrics (
                 tick                  INTEGER PRIMARY KEY,
                 sim_time_secs         REAL NOT NULL,
                 delivered_count       INTEGER NOT NULL,
                 packages_per_minute   REAL NOT NULL,
                 dwell_current_secs    REAL NOT NULL,
                 dwell_avg_secs        REAL NOT NULL,
                 dwell_max_secs        REAL NOT NULL,
                 delivery_current_secs REAL NOT NULL,
                 delivery_avg_secs     REAL NOT NULL,
                 delivery_max_secs     REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS vehicle_snapshots (
                 vehicle_id  INTEGER NOT NULL,
                 tick        INTEGER NOT NULL,
                 x           REAL NOT NULL,
                 y           REAL NOT NULL,
                 heading     REAL NOT NULL,
                 fork_height REAL NOT NULL,
                 phase       TEXT NOT NULL,
                 order_id    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS order_log (
                 order_id         INTEGER NOT NULL,
                 tick             INTEGER NOT NULL,
                 pickup_station   INTEGER NOT NULL,
                 dropoff_station  INTEGER NOT NULL,
                 assigned_vehicle INTEGER NOT NULL,
                 status           TEXT NOT NULL,
                 spawned_secs     REAL NOT NULL,
                 delivered_secs   REAL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_metrics \
             (tick, sim_time_secs, delivered_count, packages_per_minute, \
              dwell_current_secs, dwell_avg_secs, dwell_max_secs, \
              delivery_current_secs, delivery_avg_secs, delivery_max_secs) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                row.tick,
                row.sim_time_secs,
                row.delivered_count,
                row.packages_per_minute,
                row.dwell_current_secs,
                row.dwell_avg_secs,
                row.dwell_max_secs,
                row.delivery_current_secs,
                row.delivery_avg_secs,
                row.delivery_max_secs,
            ],
        )?;
        Ok(())
    }

    fn write_vehicle_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_snapshots \
                 (vehicle_id, tick, x, y, heading, fork_height, phase, order_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.vehicle_id,
                    row.tick,
                    row.x,
                    row.y,
                    row.heading,
                    row.fork_height,
                    row.phase,
                    row.order_id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_order_log(&mut self, rows: &[OrderLogRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO order_log \
                 (order_id, tick, pickup_station, dropoff_station, assigned_vehicle, \
                  status, spawned_secs, delivered_secs) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.order_id,
                    row.tick,
                    row.pickup_station,
                    row.dropoff_station,
                    row.assigned_vehicle,
                    row.status,
                    row.spawned_secs,
                    row.delivered_secs,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
