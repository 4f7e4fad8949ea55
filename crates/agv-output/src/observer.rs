//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use agv_core::{OrderId, Tick, VehicleId};
use agv_fleet::FleetStore;
use agv_order::OrderBoard;
use agv_sim::{MetricsSnapshot, SimObserver};

use crate::row::{OrderLogRow, TickMetricsRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes tick metrics, vehicle snapshots, and the
/// live order table to any [`OutputWriter`] backend (CSV, SQLite,
/// Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, metrics: &MetricsSnapshot) {
        let row = TickMetricsRow {
            tick: tick.0,
            sim_time_secs: metrics.sim_time_secs,
            delivered_count: metrics.delivered_count,
            packages_per_minute: metrics.packages_per_minute,
            dwell_current_secs: metrics.dwell_current_secs,
            dwell_avg_secs: metrics.dwell_avg_secs,
            dwell_max_secs: metrics.dwell_max_secs,
            delivery_current_secs: metrics.delivery_current_secs,
            delivery_avg_secs: metrics.delivery_avg_secs,
            delivery_max_secs: metrics.delivery_max_secs,
        };
        let result = self.writer.write_tick_metrics(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, fleet: &FleetStore, board: &OrderBoard, _now_secs: f64) {
        let vehicle_rows: Vec<VehicleSnapshotRow> = fleet
            .iter()
            .map(|v| VehicleSnapshotRow {
                vehicle_id: v.id.0,
                tick: tick.0,
                x: v.pos.x,
                y: v.pos.y,
                heading: v.heading,
                fork_height: v.fork_height,
                phase: v.phase.as_str(),
                order_id: v.order.unwrap_or(OrderId::INVALID).0,
            })
            .collect();
        if !vehicle_rows.is_empty() {
            let result = self.writer.write_vehicle_snapshots(&vehicle_rows);
            self.store_err(result);
        }

        let order_rows: Vec<OrderLogRow> = board
            .live_table()
            .into_iter()
            .map(|o| OrderLogRow {
                order_id: o.id.0,
                tick: tick.0,
                pickup_station: o.pickup.0,
                dropoff_station: o.dropoff.0,
                assigned_vehicle: o.assigned_to.unwrap_or(VehicleId::INVALID).0,
                status: o.status.as_str(),
                spawned_secs: o.spawned_at,
                delivered_secs: o.delivered_at,
            })
            .collect();
        if !order_rows.is_empty() {
            let result = self.writer.write_order_log(&order_rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
