//! Station types and derived alignment geometry.
//!
//! # Orientation model
//!
//! Each pickup/dropoff station carries the heading of its painted guide
//! line; the **docking heading** — what a vehicle must hold while working
//! the station face — is that heading pre-offset by 90°.  A docked vehicle
//! faces *into* the station (fork toward the package), so every derived
//! maneuvering point sits on the opposite side of the face, out on the open
//! floor: the alignment marker, the fine-approach stand-off, and the
//! reverse-out path all lie along `-docking_dir()`.

use std::f32::consts::FRAC_PI_2;

use agv_core::{StationId, Vec2, wrap_angle};

/// What a station is used for.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationKind {
    /// Packages spawn here and wait to be collected.
    Pickup,
    /// Vehicles deposit their carried package here.
    Dropoff,
    /// A vehicle's home slot and default idle location.
    Garage,
}

impl std::fmt::Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StationKind::Pickup => "pickup",
            StationKind::Dropoff => "dropoff",
            StationKind::Garage => "garage",
        })
    }
}

/// A fixed location on the warehouse floor.
///
/// Immutable after construction.  `guide_heading` is the heading of the
/// painted guide line at pickup/dropoff stations; at garages it is the
/// parked heading restored when a vehicle returns home.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    pub id: StationId,
    pub kind: StationKind,
    pub position: Vec2,
    pub guide_heading: f32,
}

impl Station {
    /// The heading a vehicle holds while docked: the guide-line heading
    /// pre-offset by 90°.
    #[inline]
    pub fn docking_heading(&self) -> f32 {
        wrap_angle(self.guide_heading + FRAC_PI_2)
    }

    /// Unit vector along the docking heading — pointing *into* the station
    /// face.
    #[inline]
    pub fn docking_dir(&self) -> Vec2 {
        Vec2::from_angle(self.docking_heading())
    }

    /// The navigation marker `offset` units out on the open floor in front
    /// of the station face.  Vehicles target this point during coarse
    /// travel, then fine-maneuver from it.
    #[inline]
    pub fn alignment_point(&self, offset: f32) -> Vec2 {
        self.position - self.docking_dir() * offset
    }
}
