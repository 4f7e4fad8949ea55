//! The fleet arena.

use agv_core::{Vec2, VehicleId};
use agv_layout::StationRegistry;

use crate::Vehicle;

/// Arena of all vehicles, indexed by `VehicleId`.
///
/// The fleet is fixed at startup — one vehicle per garage slot, parked at its
/// slot with the slot's heading — and iteration order is insertion (ID)
/// order, which the scheduler relies on for deterministic stepping.
pub struct FleetStore {
    vehicles: Vec<Vehicle>,
}

impl FleetStore {
    /// One parked vehicle per garage slot in `registry`.
    pub fn from_garages(registry: &StationRegistry) -> Self {
        let vehicles = registry
            .garages()
            .iter()
            .enumerate()
            .filter_map(|(i, &slot)| {
                let station = registry.get(slot)?;
                Some(Vehicle::parked(
                    VehicleId(i as u32),
                    slot,
                    station.position,
                    station.guide_heading,
                ))
            })
            .collect();
        Self { vehicles }
    }

    #[inline]
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> + '_ {
        self.vehicles.iter_mut()
    }

    /// Snapshot of every vehicle position, indexed by `VehicleId`.  Taken at
    /// tick start so the proximity pass sees one consistent frame.
    pub fn positions(&self) -> Vec<Vec2> {
        self.vehicles.iter().map(|v| v.pos).collect()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
