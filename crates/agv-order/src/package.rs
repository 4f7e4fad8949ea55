//! Package lifecycle: resting at a station → on a fork → deposited → removed.

use rustc_hash::FxHashMap;

use agv_core::{PackageId, StationId, Vec2, VehicleId};

/// Where a package currently is.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageState {
    /// Resting at its origin pickup station.
    AtStation,
    /// Attached to a vehicle's fork.
    OnFork(VehicleId),
    /// Set down in the world; removed once the grace window elapses.
    Deposited { position: Vec2, at: f64 },
}

/// A transportable package.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Package {
    pub id: PackageId,
    /// The pickup station that spawned it.
    pub origin: StationId,
    pub spawned_at: f64,
    pub state: PackageState,
}

/// Arena of live packages plus per-station slot bookkeeping.
///
/// Each pickup station holds at most one resting package; `last_removed_at`
/// feeds the refill-delay check in
/// [`OrderBoard::try_spawn`](crate::OrderBoard::try_spawn).
#[derive(Default)]
pub struct PackageStore {
    packages: FxHashMap<PackageId, Package>,
    slots: FxHashMap<StationId, PackageId>,
    last_removed_at: FxHashMap<StationId, f64>,
    next_id: u32,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a package resting at `station`.
    ///
    /// The caller (the order board) is responsible for checking that the
    /// slot is empty and the refill delay has elapsed.
    pub fn spawn_at(&mut self, station: StationId, now: f64) -> PackageId {
        let id = PackageId(self.next_id);
        self.next_id += 1;
        self.packages.insert(
            id,
            Package { id, origin: station, spawned_at: now, state: PackageState::AtStation },
        );
        self.slots.insert(station, id);
        id
    }

    /// The package currently resting at `station`, if any.
    #[inline]
    pub fn slot(&self, station: StationId) -> Option<PackageId> {
        self.slots.get(&station).copied()
    }

    /// When `station`'s last package was collected.  `-inf` for stations that
    /// have never held one, so the first spawn is immediate.
    #[inline]
    pub fn last_removed_at(&self, station: StationId) -> f64 {
        self.last_removed_at.get(&station).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Move the package resting at `station` onto `vehicle`'s fork.
    ///
    /// Clears the slot and stamps `last_removed_at` (starting the refill
    /// delay).  Returns `None` when the slot is empty — callers treat that
    /// as a benign miss, not a fault.
    pub fn take_from_station(
        &mut self,
        station: StationId,
        vehicle: VehicleId,
        now: f64,
    ) -> Option<PackageId> {
        let id = self.slots.remove(&station)?;
        self.last_removed_at.insert(station, now);
        if let Some(pkg) = self.packages.get_mut(&id) {
            pkg.state = PackageState::OnFork(vehicle);
        }
        Some(id)
    }

    /// Detach `package` from a fork and set it down at `position`.
    /// No-op for unknown IDs.
    pub fn deposit(&mut self, package: PackageId, position: Vec2, now: f64) {
        if let Some(pkg) = self.packages.get_mut(&package) {
            pkg.state = PackageState::Deposited { position, at: now };
        }
    }

    /// Remove deposited packages whose grace window has elapsed.
    /// Returns how many were removed.
    pub fn purge_deposited(&mut self, now: f64, grace_secs: f64) -> usize {
        let before = self.packages.len();
        self.packages.retain(|_, pkg| match pkg.state {
            PackageState::Deposited { at, .. } => now - at < grace_secs,
            _ => true,
        });
        before - self.packages.len()
    }

    #[inline]
    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(&id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
