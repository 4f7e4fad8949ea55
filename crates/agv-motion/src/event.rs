//! Notifications emitted by a vehicle step.

use agv_core::{OrderId, VehicleId};

/// Something noteworthy that happened during one `step_vehicle` call.
///
/// The state machine mutates vehicle/order/lock state directly; events exist
/// for the *observers* of that mutation — the metrics aggregator chiefly —
/// so they never need to diff the world to see what changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepEvent {
    /// An order left the waiting pool and now belongs to a vehicle.
    OrderAssigned { order: OrderId, vehicle: VehicleId },

    /// The package came off its station onto a fork.  `dwell_secs` is how
    /// long it waited there.
    PackagePicked { order: OrderId, dwell_secs: f64 },

    /// The package was set down at the dropoff.  `delivery_secs` spans
    /// pickup to set-down.
    PackageDropped { order: OrderId, delivery_secs: f64 },

    /// The order completed its lifecycle (fork lowered, status `Delivered`).
    OrderDelivered { order: OrderId },

    /// The vehicle parked at its garage slot and went idle.
    Parked { vehicle: VehicleId },
}
