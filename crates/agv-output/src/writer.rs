//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OrderLogRow, OutputResult, TickMetricsRow, VehicleSnapshotRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`SimOutputObserver::take_error`].
pub trait OutputWriter {
    /// Write one tick's aggregate metrics row.
    fn write_tick_metrics(&mut self, row: &TickMetricsRow) -> OutputResult<()>;

    /// Write a batch of vehicle snapshots.
    fn write_vehicle_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()>;

    /// Write a batch of live order-table rows.
    fn write_order_log(&mut self, rows: &[OrderLogRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
