//! Transport orders and their status lifecycle.

use agv_core::{OrderId, PackageId, StationId, VehicleId};

/// Lifecycle of an order.
///
/// Transitions run strictly forward:
/// `Waiting → InProgress → PickedUp → Delivered`, after which the order is
/// purged from the live set once the display grace window elapses.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderStatus {
    /// Spawned, not yet assigned to a vehicle.
    Waiting,
    /// A vehicle is on its way to the pickup station.
    InProgress,
    /// The package is on the assigned vehicle's fork.
    PickedUp,
    /// Deposited at the dropoff station.
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Waiting => "waiting",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transport order, created 1:1 with a package spawn.
///
/// The dropoff is drawn uniformly at random among dropoff stations **at
/// creation time** and never changes afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub pickup: StationId,
    pub dropoff: StationId,
    pub package: PackageId,
    pub spawned_at: f64,
    /// The vehicle holding `InProgress`/`PickedUp` ownership, if any.
    /// At most one vehicle ever owns an order at a time.
    pub assigned_to: Option<VehicleId>,
    pub delivered_at: Option<f64>,
}

impl Order {
    /// Seconds this order's package has been waiting at its pickup station.
    /// Meaningful while `Waiting`/`InProgress`; frozen at pickup otherwise.
    #[inline]
    pub fn dwell_secs(&self, now: f64) -> f64 {
        now - self.spawned_at
    }
}
