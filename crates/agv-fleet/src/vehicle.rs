//! Per-vehicle state.

use agv_core::{OrderId, PackageId, StationId, Vec2, VehicleId};

use crate::Phase;

/// One AGV.
///
/// Created once per garage slot at startup and never destroyed.  The pose
/// (`pos`, `heading`) and `fork_height` are mutated only by the motion state
/// machine; the order/cargo bindings follow the order lifecycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id: VehicleId,

    // ── Pose ──────────────────────────────────────────────────────────────
    pub pos: Vec2,
    /// Radians, counter-clockwise from +x.
    pub heading: f32,
    /// Fork lift height in `[0, fork_raised]`.
    pub fork_height: f32,

    // ── State machine ─────────────────────────────────────────────────────
    pub phase: Phase,

    // ── Order / cargo bindings ────────────────────────────────────────────
    pub order: Option<OrderId>,
    pub cargo: Option<PackageId>,
    /// Set when the package is lifted, cleared when it is set down.  Feeds
    /// the delivery-time metric.
    pub delivery_started_at: Option<f64>,

    // ── Phase-local bookkeeping ───────────────────────────────────────────
    /// Remembered exit point for `DriveOut` / `DeliveryExit`.
    pub drive_out_target: Option<Vec2>,
    /// Station lock carried out of `Drop` after the order is cleared, so the
    /// exit phases know what to release.
    pub release_pending: Option<StationId>,

    // ── Home slot ─────────────────────────────────────────────────────────
    pub garage: StationId,
    /// Heading restored on parking.
    pub parked_heading: f32,
    /// When set, the vehicle returns to its garage after the current
    /// delivery instead of looping back to `Translate`.
    pub standby_requested: bool,
}

impl Vehicle {
    /// Construct a vehicle parked at its garage slot.
    pub fn parked(id: VehicleId, garage: StationId, pos: Vec2, heading: f32) -> Self {
        Self {
            id,
            pos,
            heading,
            fork_height: 0.0,
            phase: Phase::Idle,
            order: None,
            cargo: None,
            delivery_started_at: None,
            drive_out_target: None,
            release_pending: None,
            garage,
            parked_heading: heading,
            standby_requested: false,
        }
    }

    /// Unit vector along the current heading.
    #[inline]
    pub fn heading_dir(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// The fork-offset point `offset` units ahead of the chassis origin.
    /// Steering measures arrival from here, and rotation phases pivot the
    /// chassis around it.
    #[inline]
    pub fn fork_point(&self, offset: f32) -> Vec2 {
        self.pos + self.heading_dir() * offset
    }

    /// `true` when the vehicle can accept an external activate command.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}
