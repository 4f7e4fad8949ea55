//! Planar vector type and angle utilities.
//!
//! `Vec2` uses `f32` components: warehouse coordinates span tens of units, so
//! single precision gives sub-millimetre resolution while halving memory
//! versus `f64`.  Simulation *time* stays `f64` (see [`crate::time`]) because
//! dwell comparisons use a 0.01 s tolerance over arbitrarily long runs.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A point or direction in the warehouse plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    /// Default fallback direction for guarded normalization.
    pub const UNIT_X: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading` (radians, counter-clockwise from +x).
    #[inline]
    pub fn from_angle(heading: f32) -> Self {
        Self { x: heading.cos(), y: heading.sin() }
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f32 {
        (other - self).length_sq()
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Left-hand normal (rotate 90° counter-clockwise).  Used for the
    /// station-local lateral axis.
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2 { x: -self.y, y: self.x }
    }

    /// The angle of this vector in radians, in `(-π, π]`.
    #[inline]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Normalize, falling back to `fallback` when the vector is too short to
    /// carry a direction.  Zero-length directions must never reach a division;
    /// callers pass the vehicle's current heading as the fallback.
    #[inline]
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            fallback
        } else {
            Vec2 { x: self.x / len, y: self.y / len }
        }
    }

    /// Rotate this vector by `theta` radians counter-clockwise.
    #[inline]
    pub fn rotated(self, theta: f32) -> Vec2 {
        let (s, c) = theta.sin_cos();
        Vec2 {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Clamp componentwise into `[min, max]`.
    #[inline]
    pub fn clamp(self, min: Vec2, max: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2 { x: -self.x, y: -self.y }
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Angle helpers ─────────────────────────────────────────────────────────────

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = a % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Signed shortest rotation from `current` to `target`, in `(-π, π]`.
#[inline]
pub fn angle_diff(target: f32, current: f32) -> f32 {
    wrap_angle(target - current)
}
