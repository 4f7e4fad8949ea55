//! Fluent builder for constructing a [`Sim`].

use agv_core::{SimConfig, SimRng};
use agv_fleet::FleetStore;
use agv_layout::{LockConfig, OccupancyLedger, StationRegistry};
use agv_motion::{MotionProfile, ProximityConfig};
use agv_order::{DispatchConfig, OrderBoard, PackageStore};

use crate::{MetricsAggregator, MetricsSnapshot, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — frame delta, speed factor, total ticks, seed
/// - [`StationRegistry`] — from [`agv_layout::LayoutBuilder`]; must contain
///   at least one garage slot (one vehicle is created per slot)
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                      |
/// |------------------|------------------------------|
/// | `.profile(p)`    | `MotionProfile::default()`   |
/// | `.proximity(p)`  | `ProximityConfig::default()` |
/// | `.dispatch(d)`   | `DispatchConfig::default()`  |
/// | `.lock_config(l)`| `LockConfig::default()`      |
///
/// # Example
///
/// ```rust,ignore
/// let registry = LayoutBuilder::new()/* … */.build();
/// let mut sim = SimBuilder::new(SimConfig::default(), registry).build()?;
/// sim.activate_all();
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config: SimConfig,
    registry: StationRegistry,
    profile: MotionProfile,
    proximity: ProximityConfig,
    dispatch: DispatchConfig,
    locks: LockConfig,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, registry: StationRegistry) -> Self {
        Self {
            config,
            registry,
            profile: MotionProfile::default(),
            proximity: ProximityConfig::default(),
            dispatch: DispatchConfig::default(),
            locks: LockConfig::default(),
        }
    }

    /// Motion tuning (speeds, rates, thresholds).
    pub fn profile(mut self, profile: MotionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Proximity sensing tuning (radii, falloff law, avoidance weight).
    pub fn proximity(mut self, proximity: ProximityConfig) -> Self {
        self.proximity = proximity;
        self
    }

    /// Dispatch tuning (spawn delay, grace windows, dwell tolerance).
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Occupancy tuning (station re-use cooldown).
    pub fn lock_config(mut self, locks: LockConfig) -> Self {
        self.locks = locks;
        self
    }

    /// Validate inputs, build the fleet and ledgers, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        if !(self.config.frame_dt > 0.0) {
            return Err(SimError::Config(format!(
                "frame_dt must be positive, got {}",
                self.config.frame_dt
            )));
        }
        if self.config.speed_factor < 0.0 {
            return Err(SimError::Config("speed_factor must be >= 0".into()));
        }
        if self.registry.garages().is_empty() {
            return Err(SimError::NoGarages);
        }

        let fleet = FleetStore::from_garages(&self.registry);
        let locks = OccupancyLedger::new(self.registry.len(), self.locks);
        let rng = SimRng::new(self.config.seed);

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            registry: self.registry,
            locks,
            board: OrderBoard::new(self.dispatch),
            packages: PackageStore::new(),
            fleet,
            profile: self.profile,
            proximity: self.proximity,
            metrics: MetricsAggregator::new(),
            rng,
            last_metrics: MetricsSnapshot::default(),
        })
    }
}
