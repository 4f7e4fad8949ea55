//! Low-level steering and rotation helpers.
//!
//! Pure pose arithmetic, shared by several phases of the state machine.
//! Everything here is saturating/clamped: a helper may move a pose *up to*
//! its rate limit per call, never beyond.

use agv_core::{Vec2, angle_diff, wrap_angle};

/// Proportional steering step: turn `heading` toward the direction `dir`,
/// changing it by at most `max_turn` radians.  Returns the new heading.
#[inline]
pub fn steer_toward(heading: f32, dir: Vec2, max_turn: f32) -> f32 {
    let err = angle_diff(dir.angle(), heading);
    wrap_angle(heading + err.clamp(-max_turn, max_turn))
}

/// Turn `heading` toward `target` by at most `max_turn` radians.
#[inline]
pub fn turn_to_heading(heading: f32, target: f32, max_turn: f32) -> f32 {
    let err = angle_diff(target, heading);
    wrap_angle(heading + err.clamp(-max_turn, max_turn))
}

/// Rotate a pose by `dtheta` around `pivot`.
///
/// The chassis origin orbits the pivot while the heading turns with it —
/// this is how a vehicle aligns to a station without sweeping its fork tip
/// across the face.  The pivot itself is the fixed point of the motion.
#[inline]
pub fn rotate_about_pivot(pos: Vec2, heading: f32, pivot: Vec2, dtheta: f32) -> (Vec2, f32) {
    let new_pos = pivot + (pos - pivot).rotated(dtheta);
    (new_pos, wrap_angle(heading + dtheta))
}
