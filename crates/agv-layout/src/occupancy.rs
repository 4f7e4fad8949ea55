//! Single-occupancy station locking.
//!
//! # Why this exists
//!
//! Two vehicles docking at the same station face would interleave their fine
//! maneuvers and corrupt both alignments.  The ledger serializes access: a
//! vehicle claims a station before maneuvering at it and releases it once it
//! has driven clear.  A released station may additionally be held back for a
//! cooldown window before the next claim — some deployments want the floor
//! area to clear before the next vehicle commits to it.
//!
//! Locking is cooperative and advisory, like everything in the core: the
//! ledger never moves a vehicle, it only answers claim/hold queries.

use agv_core::{StationId, VehicleId};

/// Occupancy tuning.
///
/// Source deployments disagree on the cooldown (0 s in some, 10 s in
/// others), so it is a config value rather than a constant.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockConfig {
    /// Seconds after `release` during which `is_locked` still reports the
    /// station as unavailable.  `0.0` disables the window.
    pub reuse_cooldown_secs: f64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { reuse_cooldown_secs: 0.0 }
    }
}

/// Per-station occupancy records: who holds each station, and when it was
/// last released.
///
/// Indexed directly by `StationId` (parallel `Vec`s sized to the registry).
pub struct OccupancyLedger {
    occupied_by: Vec<Option<VehicleId>>,
    released_at: Vec<f64>,
    cfg: LockConfig,
}

impl OccupancyLedger {
    /// Create a ledger covering `station_count` stations, all unoccupied and
    /// with their cooldown windows already expired.
    pub fn new(station_count: usize, cfg: LockConfig) -> Self {
        Self {
            occupied_by: vec![None; station_count],
            released_at: vec![f64::NEG_INFINITY; station_count],
            cfg,
        }
    }

    /// Claim `station` for `vehicle`.
    ///
    /// Succeeds when the station is free or already held by the same vehicle
    /// (re-acquire is a no-op).  Returns `false` when another vehicle holds
    /// it.  Unknown IDs return `false`.
    pub fn try_acquire(&mut self, station: StationId, vehicle: VehicleId) -> bool {
        match self.occupied_by.get_mut(station.index()) {
            None => false,
            Some(slot) => match *slot {
                None => {
                    *slot = Some(vehicle);
                    true
                }
                Some(holder) => holder == vehicle,
            },
        }
    }

    /// Release `station` and stamp the cooldown window.
    ///
    /// Idempotent: releasing an unoccupied station is not an error (the
    /// release stamp is refreshed either way).
    pub fn release(&mut self, station: StationId, now: f64) {
        if let Some(slot) = self.occupied_by.get_mut(station.index()) {
            *slot = None;
            self.released_at[station.index()] = now;
        }
    }

    /// The vehicle currently holding `station`, if any.
    #[inline]
    pub fn occupant(&self, station: StationId) -> Option<VehicleId> {
        self.occupied_by.get(station.index()).copied().flatten()
    }

    /// `true` when `station` is unavailable to `vehicle`: held by a
    /// *different* vehicle, or still inside the post-release cooldown.
    pub fn is_locked(&self, station: StationId, vehicle: VehicleId, now: f64) -> bool {
        let Some(slot) = self.occupied_by.get(station.index()) else {
            return false;
        };
        match *slot {
            Some(holder) if holder != vehicle => true,
            Some(_) => false, // held by `vehicle` itself
            None => now - self.released_at[station.index()] < self.cfg.reuse_cooldown_secs,
        }
    }
}
