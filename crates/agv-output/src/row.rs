//! Plain data row types written by output backends.

/// One tick's aggregate metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMetricsRow {
    pub tick: u64,
    pub sim_time_secs: f64,
    pub delivered_count: u64,
    pub packages_per_minute: f64,
    pub dwell_current_secs: f64,
    pub dwell_avg_secs: f64,
    pub dwell_max_secs: f64,
    pub delivery_current_secs: f64,
    pub delivery_avg_secs: f64,
    pub delivery_max_secs: f64,
}

/// A snapshot of one vehicle's pose and bindings at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshotRow {
    pub vehicle_id: u32,
    pub tick: u64,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub fork_height: f32,
    pub phase: &'static str,
    /// `u32::MAX` when the vehicle has no current order.
    pub order_id: u32,
}

/// One live order-table entry at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLogRow {
    pub order_id: u32,
    pub tick: u64,
    pub pickup_station: u32,
    pub dropoff_station: u32,
    /// `u32::MAX` when unassigned.
    pub assigned_vehicle: u32,
    pub status: &'static str,
    pub spawned_secs: f64,
    /// `None` until the order is delivered.
    pub delivered_secs: Option<f64>,
}
