//! Motion tuning.
//!
//! The source deployments re-derived these numbers ad hoc in each of their
//! near-duplicate variants; here every speed, rate, and threshold is a named
//! config field with the nominal value as its default.  Angles are radians,
//! distances warehouse units, speeds units/second.

/// All numeric knobs of the vehicle motion state machine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionProfile {
    // ── Chassis geometry ──────────────────────────────────────────────────
    /// Distance of the fork-offset point ahead of the chassis origin.
    /// Steering measures arrival from this point and rotation phases pivot
    /// around it.
    pub fork_offset: f32,

    // ── Free travel (Translate / ToDelivery) ──────────────────────────────
    /// Cruise speed.
    pub cruise_speed: f32,
    /// Per-second cap on heading change during proportional steering.
    pub heading_gain: f32,
    /// Fork-point distance at which Translate hands over to Rotate.
    pub translate_arrive: f32,
    /// Fork-point distance at which ToDelivery hands over to AlignDelivery.
    pub delivery_arrive: f32,

    // ── Rotate (pickup docking turn) ──────────────────────────────────────
    /// Turn rate while aligning to the pickup docking heading.
    pub rotate_rate: f32,
    /// Within this distance of the station the heading snaps immediately.
    pub rotate_stop_radius: f32,
    /// Angular error below which the heading snaps exactly.
    pub rotate_snap_tol: f32,

    // ── Approach (pickup fine drive) ──────────────────────────────────────
    /// Straight-line speed toward the station face.
    pub approach_speed: f32,
    /// Stand-off distance of the docked position from the station face.
    pub approach_offset: f32,
    /// Arrival tolerance at the stand-off point.
    pub approach_arrive: f32,

    // ── Fork ──────────────────────────────────────────────────────────────
    /// Lift/lower rate.
    pub fork_rate: f32,
    /// Raised fork height.
    pub fork_raised: f32,

    // ── Exits (DriveOut / DeliveryExit) ───────────────────────────────────
    /// How far the vehicle backs away from a station face.
    pub drive_out_dist: f32,
    /// Reverse speed while backing out.
    pub drive_out_speed: f32,
    /// Arrival tolerance at the remembered exit point.
    pub drive_out_arrive: f32,

    // ── AlignDelivery / DeliveryCenter ────────────────────────────────────
    /// Turn rate while aligning to the delivery heading.
    pub align_rate: f32,
    /// Angular error below which the delivery heading snaps exactly.
    pub align_tol: f32,
    /// Fine-approach point: this far forward of the dropoff marker
    /// (station-local, toward the face)…
    pub center_forward: f32,
    /// …and this far lateral of it (left of the docking axis is positive).
    pub center_lateral: f32,
    /// Arrival tolerance at the fine-approach point.
    pub center_arrive: f32,

    // ── ReturnToGarage ────────────────────────────────────────────────────
    /// Homing speed.
    pub return_speed: f32,
    /// Arrival tolerance at the garage slot.
    pub return_arrive: f32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            fork_offset: 1.2,

            cruise_speed: 1.5,
            heading_gain: 1.0,
            translate_arrive: 0.1,
            delivery_arrive: 0.5,

            rotate_rate: 20.9_f32.to_radians(),
            rotate_stop_radius: 0.5,
            rotate_snap_tol: 2.0_f32.to_radians(),

            approach_speed: 1.5,
            approach_offset: 0.6,
            approach_arrive: 0.05,

            fork_rate: 0.5,
            fork_raised: 1.0,

            drive_out_dist: 5.0,
            drive_out_speed: 0.5,
            drive_out_arrive: 0.1,

            align_rate: 90.0_f32.to_radians(),
            align_tol: 1.0_f32.to_radians(),
            center_forward: 2.3,
            center_lateral: -0.5,
            center_arrive: 0.05,

            return_speed: 1.0,
            return_arrive: 0.1,
        }
    }
}
