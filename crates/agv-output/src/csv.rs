//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tick_metrics.csv`
//! - `vehicle_snapshots.csv`
//! - `order_log.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OrderLogRow, OutputResult, TickMetricsRow, VehicleSnapshotRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    metrics: Writer<File>,
    vehicles: Writer<File>,
    orders: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut metrics = Writer::from_path(dir.join("tick_metrics.csv"))?;
        metrics.write_record([
            "tick",
            "sim_time_secs",
            "delivered_count",
            "packages_per_minute",
            "dwell_current_secs",
            "dwell_avg_secs",
            "dwell_max_secs",
            "delivery_current_secs",
            "delivery_avg_secs",
            "delivery_max_secs",
        ])?;

        let mut vehicles = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        vehicles.write_record([
            "vehicle_id", "tick", "x", "y", "heading", "fork_height", "phase", "order_id",
        ])?;

        let mut orders = Writer::from_path(dir.join("order_log.csv"))?;
        orders.write_record([
            "order_id",
            "tick",
            "pickup_station",
            "dropoff_station",
            "assigned_vehicle",
            "status",
            "spawned_secs",
            "delivered_secs",
        ])?;

        Ok(Self {
            metrics,
            vehicles,
            orders,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.tick.to_string(),
            row.sim_time_secs.to_string(),
            row.delivered_count.to_string(),
            row.packages_per_minute.to_string(),
            row.dwell_current_secs.to_string(),
            row.dwell_avg_secs.to_string(),
            row.dwell_max_secs.to_string(),
            row.delivery_current_secs.to_string(),
            row.delivery_avg_secs.to_string(),
            row.delivery_max_secs.to_string(),
        ])?;
        Ok(())
    }

    fn write_vehicle_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.vehicles.write_record(&[
                row.vehicle_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.heading.to_string(),
                row.fork_height.to_string(),
                row.phase.to_string(),
                row.order_id.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_order_log(&mut self, rows: &[OrderLogRow]) -> OutputResult<()> {
        for row in rows {
            self.orders.write_record(&[
                row.order_id.to_string(),
                row.tick.to_string(),
                row.pickup_station.to_string(),
                row.dropoff_station.to_string(),
                row.assigned_vehicle.to_string(),
                row.status.to_string(),
                row.spawned_secs.to_string(),
                row.delivered_secs.map(|s| s.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.metrics.flush()?;
        self.vehicles.flush()?;
        self.orders.flush()?;
        Ok(())
    }
}
