//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `tick_metrics.parquet`
//! - `vehicle_snapshots.parquet`
//! - `order_log.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float32Builder, Float64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{OrderLogRow, OutputResult, TickMetricsRow, VehicleSnapshotRow};

fn metrics_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",                  DataType::UInt64,  false),
        Field::new("sim_time_secs",         DataType::Float64, false),
        Field::new("delivered_count",       DataType::UInt64,  false),
        Field::new("packages_per_minute",   DataType::Float64, false),
        Field::new("dwell_current_secs",    DataType::Float64, false),
        Field::new("dwell_avg_secs",        DataType::Float64, false),
        Field::new("dwell_max_secs",        DataType::Float64, false),
        Field::new("delivery_current_secs", DataType::Float64, false),
        Field::new("delivery_avg_secs",     DataType::Float64, false),
        Field::new("delivery_max_secs",     DataType::Float64, false),
    ]))
}

fn vehicle_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("vehicle_id",  DataType::UInt32,  false),
        Field::new("tick",        DataType::UInt64,  false),
        Field::new("x",           DataType::Float32, false),
        Field::new("y",           DataType::Float32, false),
        Field::new("heading",     DataType::Float32, false),
        Field::new("fork_height", DataType::Float32, false),
        Field::new("phase",       DataType::Utf8,    false),
        Field::new("order_id",    DataType::UInt32,  false),
    ]))
}

fn order_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id",         DataType::UInt32,  false),
        Field::new("tick",             DataType::UInt64,  false),
        Field::new("pickup_station",   DataType::UInt32,  false),
        Field::new("dropoff_station",  DataType::UInt32,  false),
        Field::new("assigned_vehicle", DataType::UInt32,  false),
        Field::new("status",           DataType::Utf8,    false),
        Field::new("spawned_secs",     DataType::Float64, false),
        Field::new("delivered_secs",   DataType::Float64, true),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    metrics: Option<ArrowWriter<File>>,
    vehicles: Option<ArrowWriter<File>>,
    orders: Option<ArrowWriter<File>>,
    metrics_schema: Arc<Schema>,
    vehicle_schema: Arc<Schema>,
    order_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create all three Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let metrics_schema = metrics_schema();
        let vehicle_schema = vehicle_schema();
        let order_schema = order_schema();

        let metrics = ArrowWriter::try_new(
            File::create(dir.join("tick_metrics.parquet"))?,
            Arc::clone(&metrics_schema),
            Some(snappy_props()),
        )?;
        let vehicles = ArrowWriter::try_new(
            File::create(dir.join("vehicle_snapshots.parquet"))?,
            Arc::clone(&vehicle_schema),
            Some(snappy_props()),
        )?;
        let orders = ArrowWriter::try_new(
            File::create(dir.join("order_log.parquet"))?,
            Arc::clone(&order_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            metrics: Some(metrics),
            vehicles: Some(vehicles),
            orders: Some(orders),
            metrics_schema,
            vehicle_schema,
            order_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()> {
        let Some(writer) = self.metrics.as_mut() else {
            return Ok(());
        };

        let mut ticks = UInt64Builder::new();
        let mut sim_times = Float64Builder::new();
        let mut delivered = UInt64Builder::new();
        let mut ppm = Float64Builder::new();
        let mut dwell_cur = Float64Builder::new();
        let mut dwell_avg = Float64Builder::new();
        let mut dwell_max = Float64Builder::new();
        let mut deliv_cur = Float64Builder::new();
        let mut deliv_avg = Float64Builder::new();
        let mut deliv_max = Float64Builder::new();

        ticks.append_value(row.tick);
        sim_times.append_value(row.sim_time_secs);
        delivered.append_value(row.delivered_count);
        ppm.append_value(row.packages_per_minute);
        dwell_cur.append_value(row.dwell_current_secs);
        dwell_avg.append_value(row.dwell_avg_secs);
        dwell_max.append_value(row.dwell_max_secs);
        deliv_cur.append_value(row.delivery_current_secs);
        deliv_avg.append_value(row.delivery_avg_secs);
        deliv_max.append_value(row.delivery_max_secs);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.metrics_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(sim_times.finish()),
                Arc::new(delivered.finish()),
                Arc::new(ppm.finish()),
                Arc::new(dwell_cur.finish()),
                Arc::new(dwell_avg.finish()),
                Arc::new(dwell_max.finish()),
                Arc::new(deliv_cur.finish()),
                Arc::new(deliv_avg.finish()),
                Arc::new(deliv_max.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_vehicle_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.vehicles.as_mut() else {
            return Ok(());
        };

        let mut vehicle_ids = UInt32Builder::new();
        let mut ticks = UInt64Builder::new();
        let mut xs = Float32Builder::new();
        let mut ys = Float32Builder::new();
        let mut headings = Float32Builder::new();
        let mut fork_heights = Float32Builder::new();
        let mut phases = StringBuilder::new();
        let mut order_ids = UInt32Builder::new();

        for row in rows {
            vehicle_ids.append_value(row.vehicle_id);
            ticks.append_value(row.tick);
            xs.append_value(row.x);
            ys.append_value(row.y);
            headings.append_value(row.heading);
            fork_heights.append_value(row.fork_height);
            phases.append_value(row.phase);
            order_ids.append_value(row.order_id);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.vehicle_schema),
            vec![
                Arc::new(vehicle_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(xs.finish()),
                Arc::new(ys.finish()),
                Arc::new(headings.finish()),
                Arc::new(fork_heights.finish()),
                Arc::new(phases.finish()),
                Arc::new(order_ids.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_order_log(&mut self, rows: &[OrderLogRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.orders.as_mut() else {
            return Ok(());
        };

        let mut order_ids = UInt32Builder::new();
        let mut ticks = UInt64Builder::new();
        let mut pickups = UInt32Builder::new();
        let mut dropoffs = UInt32Builder::new();
        let mut vehicles = UInt32Builder::new();
        let mut statuses = StringBuilder::new();
        let mut spawned = Float64Builder::new();
        let mut delivered = Float64Builder::new();

        for row in rows {
            order_ids.append_value(row.order_id);
            ticks.append_value(row.tick);
            pickups.append_value(row.pickup_station);
            dropoffs.append_value(row.dropoff_station);
            vehicles.append_value(row.assigned_vehicle);
            statuses.append_value(row.status);
            spawned.append_value(row.spawned_secs);
            delivered.append_option(row.delivered_secs);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.order_schema),
            vec![
                Arc::new(order_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(pickups.finish()),
                Arc::new(dropoffs.finish()),
                Arc::new(vehicles.finish()),
                Arc::new(statuses.finish()),
                Arc::new(spawned.finish()),
                Arc::new(delivered.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.metrics.take() {
            w.close()?;
        }
        if let Some(w) = self.vehicles.take() {
            w.close()?;
        }
        if let Some(w) = self.orders.take() {
            w.close()?;
        }
        Ok(())
    }
}
