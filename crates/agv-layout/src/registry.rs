//! Station registry, layout builder, and spatial index.
//!
//! # Data layout
//!
//! Stations live in a single arena `Vec<Station>` indexed by `StationId`;
//! per-kind ID lists give O(1) iteration over pickups, dropoffs, and garages
//! without filtering the arena.  Nothing in the registry changes after
//! `build()` — dynamic station state (occupancy, resting packages) is keyed
//! by `StationId` in other crates.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `StationId`.  Used by
//! the proximity module to treat station structures as static obstacles, and
//! by external tooling to resolve "which station is near this point".

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use agv_core::{StationId, Vec2};

use crate::station::{Station, StationKind};

// ── R-tree station entry ──────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// associated `StationId`.
#[derive(Clone)]
struct StationEntry {
    point: [f32; 2],
    id: StationId,
}

impl RTreeObject for StationEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangular world bound.
///
/// Vehicles clamp their position into it during free travel as a safety net
/// against control overshoot.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }
}

impl Default for Bounds {
    /// A generous default floor; real layouts should set their own.
    fn default() -> Self {
        Self {
            min: Vec2::new(-100.0, -100.0),
            max: Vec2::new(100.0, 100.0),
        }
    }
}

// ── StationRegistry ───────────────────────────────────────────────────────────

/// Immutable arena of all stations plus derived lookup structures.
///
/// Do not construct directly; use [`LayoutBuilder`].
pub struct StationRegistry {
    stations: Vec<Station>,
    pickups: Vec<StationId>,
    dropoffs: Vec<StationId>,
    garages: Vec<StationId>,

    /// Navigation target used when a vehicle has no order to steer at.
    pub fallback_marker: Vec2,
    /// World clamp rectangle.
    pub bounds: Bounds,

    /// How far out from the station face the per-station alignment marker
    /// sits.
    alignment_offset: f32,

    index: RTree<StationEntry>,
}

impl StationRegistry {
    // ── Arena access ──────────────────────────────────────────────────────

    /// Look up a station.  `None` for unknown IDs — callers fall back to
    /// defaults rather than faulting.
    #[inline]
    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Iterator over all stations in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter()
    }

    // ── Per-kind lists ────────────────────────────────────────────────────

    pub fn pickups(&self) -> &[StationId] {
        &self.pickups
    }

    pub fn dropoffs(&self) -> &[StationId] {
        &self.dropoffs
    }

    pub fn garages(&self) -> &[StationId] {
        &self.garages
    }

    // ── Derived geometry ──────────────────────────────────────────────────

    /// The alignment marker for `id`, or `None` for unknown IDs.
    #[inline]
    pub fn alignment_point(&self, id: StationId) -> Option<Vec2> {
        self.get(id).map(|s| s.alignment_point(self.alignment_offset))
    }

    /// The alignment marker for `id`, or the global fallback marker.
    #[inline]
    pub fn alignment_point_or_fallback(&self, id: StationId) -> Vec2 {
        self.alignment_point(id).unwrap_or(self.fallback_marker)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The station nearest to `pos`, or `None` for an empty layout.
    pub fn nearest_station(&self, pos: Vec2) -> Option<StationId> {
        self.index.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// Positions of all stations within `radius` of `pos`.  Feeds the
    /// static-obstacle side of the proximity throttle.
    pub fn stations_within(&self, pos: Vec2, radius: f32) -> impl Iterator<Item = Vec2> + '_ {
        self.index
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .map(|e| Vec2::new(e.point[0], e.point[1]))
    }
}

// ── LayoutBuilder ─────────────────────────────────────────────────────────────

/// Construct a [`StationRegistry`] incrementally, then call
/// [`build`](Self::build).
///
/// The builder accepts stations in any order; `build()` assembles the
/// per-kind lists and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use agv_core::Vec2;
/// use agv_layout::LayoutBuilder;
///
/// let mut b = LayoutBuilder::new();
/// let p = b.add_pickup(Vec2::new(0.0, 10.0), 0.0);
/// let d = b.add_dropoff(Vec2::new(20.0, 10.0), 0.0);
/// let g = b.add_garage(Vec2::new(10.0, 0.0), 1.57);
/// let reg = b.build();
/// assert_eq!(reg.len(), 3);
/// assert_eq!(reg.pickups(), &[p]);
/// assert_eq!(reg.dropoffs(), &[d]);
/// assert_eq!(reg.garages(), &[g]);
/// ```
pub struct LayoutBuilder {
    stations: Vec<Station>,
    fallback_marker: Vec2,
    bounds: Bounds,
    alignment_offset: f32,
}

/// Default distance of the alignment marker from its station.
const DEFAULT_ALIGNMENT_OFFSET: f32 = 3.0;

impl LayoutBuilder {
    pub fn new() -> Self {
        Self {
            stations: Vec::new(),
            fallback_marker: Vec2::ZERO,
            bounds: Bounds::default(),
            alignment_offset: DEFAULT_ALIGNMENT_OFFSET,
        }
    }

    fn add(&mut self, kind: StationKind, position: Vec2, guide_heading: f32) -> StationId {
        let id = StationId(self.stations.len() as u32);
        self.stations.push(Station { id, kind, position, guide_heading });
        id
    }

    /// Add a pickup station.  `guide_heading` is the painted guide line's
    /// heading; the docking heading derives from it (pre-offset by 90°).
    pub fn add_pickup(&mut self, position: Vec2, guide_heading: f32) -> StationId {
        self.add(StationKind::Pickup, position, guide_heading)
    }

    /// Add a dropoff station.
    pub fn add_dropoff(&mut self, position: Vec2, guide_heading: f32) -> StationId {
        self.add(StationKind::Dropoff, position, guide_heading)
    }

    /// Add a garage slot.  `parked_heading` is restored when the vehicle
    /// assigned to this slot returns home.
    pub fn add_garage(&mut self, position: Vec2, parked_heading: f32) -> StationId {
        self.add(StationKind::Garage, position, parked_heading)
    }

    /// Navigation target for vehicles with no current order.
    pub fn fallback_marker(mut self, marker: Vec2) -> Self {
        self.fallback_marker = marker;
        self
    }

    /// World clamp rectangle (default ±100 units).
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Distance of each station's alignment marker from the station face
    /// (default 3.0 units).
    pub fn alignment_offset(mut self, offset: f32) -> Self {
        self.alignment_offset = offset;
        self
    }

    /// Consume the builder and produce a [`StationRegistry`].
    pub fn build(self) -> StationRegistry {
        let mut pickups = Vec::new();
        let mut dropoffs = Vec::new();
        let mut garages = Vec::new();
        for s in &self.stations {
            match s.kind {
                StationKind::Pickup => pickups.push(s.id),
                StationKind::Dropoff => dropoffs.push(s.id),
                StationKind::Garage => garages.push(s.id),
            }
        }

        // Bulk-load the R-tree for O(N log N) construction.
        let entries: Vec<StationEntry> = self
            .stations
            .iter()
            .map(|s| StationEntry {
                point: [s.position.x, s.position.y],
                id: s.id,
            })
            .collect();
        let index = RTree::bulk_load(entries);

        StationRegistry {
            stations: self.stations,
            pickups,
            dropoffs,
            garages,
            fallback_marker: self.fallback_marker,
            bounds: self.bounds,
            alignment_offset: self.alignment_offset,
            index,
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}
