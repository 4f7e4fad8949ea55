//! `agv-layout` — the fixed geometry of the warehouse floor.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`station`]   | `Station`, `StationKind`, derived alignment geometry         |
//! | [`registry`]  | `StationRegistry` arena + R-tree index, `LayoutBuilder`, `Bounds` |
//! | [`occupancy`] | `OccupancyLedger` — single-occupancy station locks, `LockConfig` |
//!
//! Stations are immutable after construction and owned by the registry for
//! its entire lifetime.  Everything dynamic about a station — whether a
//! package rests there, which vehicle has claimed it — lives elsewhere
//! (`agv-order`, [`occupancy`]), keyed by `StationId`.

pub mod occupancy;
pub mod registry;
pub mod station;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use occupancy::{LockConfig, OccupancyLedger};
pub use registry::{Bounds, LayoutBuilder, StationRegistry};
pub use station::{Station, StationKind};
