//! Advisory proximity throttling and congestion avoidance.
//!
//! Given the positions of everything near a vehicle — the other vehicles,
//! optionally the station structures — [`assess`] produces a [`Throttle`]:
//! a speed multiplier in `[0, 1]` plus a repulsive steering bias.  The
//! module is purely advisory: it never moves a vehicle, the state machine
//! decides what (if anything) to do with the numbers.

use agv_core::Vec2;

/// How the per-neighbor slowdown scales with closeness.
///
/// Source deployments disagree (linear in some variants, quadratic in
/// others), so the law is a config value.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Falloff {
    /// Multiplier ramps linearly from 0 at the hard-stop ring to 1 at the
    /// sensor edge.
    #[default]
    Linear,
    /// Same ramp, squared — gentler far out, sharper up close.
    Quadratic,
}

/// Proximity sensing tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProximityConfig {
    /// Neighbors beyond this distance are ignored.
    pub sensor_radius: f32,
    /// Inside this distance the multiplier is forced to 0 (full stop).
    pub hard_stop_dist: f32,
    /// Closeness → slowdown law.
    pub falloff: Falloff,
    /// Blend weight of the repulsive bias against the seek direction in the
    /// free-travel phases.  `0.0` disables avoidance steering.
    pub avoidance_weight: f32,
    /// Treat station structures as static obstacles.
    pub include_stations: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            sensor_radius: 4.0,
            hard_stop_dist: 1.0,
            falloff: Falloff::Linear,
            avoidance_weight: 0.5,
            include_stations: false,
        }
    }
}

/// The advisory output of one proximity assessment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Throttle {
    /// Speed multiplier in `[0, 1]`; `0` = full stop.
    pub multiplier: f32,
    /// Unit repulsion direction away from nearby congestion, or `Vec2::ZERO`
    /// when nothing is close.
    pub avoid: Vec2,
}

impl Throttle {
    /// No neighbors in range: full speed, no bias.
    pub const OPEN: Throttle = Throttle { multiplier: 1.0, avoid: Vec2::ZERO };
}

/// Assess the surroundings of a vehicle at `pos`.
///
/// `neighbors` yields the positions of everything that counts as an
/// obstacle — the caller excludes the vehicle itself.  The multiplier is
/// the *minimum* over all neighbors; the bias accumulates every neighbor's
/// repulsion weighted by closeness, then normalizes.
pub fn assess(
    pos: Vec2,
    neighbors: impl Iterator<Item = Vec2>,
    cfg: &ProximityConfig,
) -> Throttle {
    let span = (cfg.sensor_radius - cfg.hard_stop_dist).max(f32::EPSILON);

    let mut multiplier = 1.0_f32;
    let mut repulsion = Vec2::ZERO;
    for other in neighbors {
        let d = pos.distance(other);
        if d >= cfg.sensor_radius {
            continue;
        }

        // Closeness ramp: 0 at (or inside) the hard-stop ring, 1 at the
        // sensor edge.
        let ramp = ((d - cfg.hard_stop_dist) / span).clamp(0.0, 1.0);
        let m = match cfg.falloff {
            Falloff::Linear => ramp,
            Falloff::Quadratic => ramp * ramp,
        };
        multiplier = multiplier.min(m);

        // Coincident positions carry no direction; fall back to +x so the
        // deadlock still resolves.
        let away = (pos - other).normalize_or(Vec2::UNIT_X);
        repulsion += away * (1.0 - ramp);
    }

    let avoid = if repulsion.length_sq() > f32::EPSILON {
        repulsion.normalize_or(Vec2::UNIT_X)
    } else {
        Vec2::ZERO
    };

    Throttle { multiplier, avoid }
}
