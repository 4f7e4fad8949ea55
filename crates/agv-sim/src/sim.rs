//! The `Sim` struct, its tick loop, and the external command surface.

use agv_core::{CoreError, CoreResult, OrderId, SimClock, SimConfig, SimRng, Vec2, VehicleId};
use agv_fleet::{FleetStore, Phase, Vehicle};
use agv_layout::{OccupancyLedger, StationRegistry};
use agv_motion::machine::{StepCtx, step_vehicle};
use agv_motion::proximity::{Throttle, assess};
use agv_motion::{MotionProfile, ProximityConfig, StepEvent};
use agv_order::{Order, OrderBoard, PackageStore};

use crate::{MetricsAggregator, MetricsSnapshot, SimObserver};

/// The simulation: all state plus the tick driver.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  A UI host calls
/// [`step`](Self::step) once per frame with its measured delta; headless
/// runs use [`run`](Self::run) / [`run_ticks`](Self::run_ticks), which feed
/// the configured `frame_dt`.
pub struct Sim {
    /// Global configuration (total ticks, seed, frame delta, …).
    pub config: SimConfig,

    /// Scaled simulation clock (speed factor, pause).
    pub clock: SimClock,

    /// Immutable station geometry.
    pub registry: StationRegistry,

    /// Single-occupancy station locks.
    pub locks: OccupancyLedger,

    /// Orders: lookup map + FIFO queue.
    pub board: OrderBoard,

    /// Live packages and station slots.
    pub packages: PackageStore,

    /// The vehicles, stepped in `VehicleId` order every tick.
    pub fleet: FleetStore,

    /// Motion tuning shared by every vehicle.
    pub profile: MotionProfile,

    /// Proximity sensing tuning.
    pub proximity: ProximityConfig,

    /// Run-wide metric counters.
    pub metrics: MetricsAggregator,

    /// Seeded RNG; consumed only by the order-spawn pass.
    pub(crate) rng: SimRng,

    /// The most recent per-tick sample, for the UI layer.
    pub(crate) last_metrics: MetricsSnapshot,
}

impl Sim {
    // ── Tick driver ───────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.observed_step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.observed_step(observer);
        }
    }

    fn observed_step<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        observer.on_tick_start(tick);
        self.step(self.config.frame_dt);
        observer.on_tick_end(tick, &self.last_metrics);
        if self.config.output_interval_ticks > 0
            && tick.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(tick, &self.fleet, &self.board, self.clock.now_secs);
        }
    }

    /// Advance the whole simulation by one tick, consuming `frame_dt`
    /// wall-clock seconds (scaled by the speed factor).
    pub fn step(&mut self, frame_dt: f64) {
        let dt = self.clock.advance(frame_dt);
        let now = self.clock.now_secs;

        // ── Phase 1: spawn pass ───────────────────────────────────────────
        //
        // Before any vehicle step, so a just-spawned order is visible to
        // assignment within the same tick it appears.
        for i in 0..self.registry.pickups().len() {
            let station = self.registry.pickups()[i];
            self.board
                .try_spawn(&mut self.packages, station, &self.registry, now, &mut self.rng);
        }

        // ── Phase 2: purge pass ───────────────────────────────────────────
        let package_grace = self.board.config().package_grace_secs;
        self.packages.purge_deposited(now, package_grace);
        self.board.purge_delivered(now);

        // ── Phase 3: proximity pass (read-only, tick-start snapshot) ──────
        let throttles = self.assess_throttles();

        // ── Phase 4: vehicle steps, sequential in VehicleId order ─────────
        let mut events: Vec<StepEvent> = Vec::new();
        {
            let mut ctx = StepCtx {
                registry: &self.registry,
                locks: &mut self.locks,
                board: &mut self.board,
                packages: &mut self.packages,
                profile: &self.profile,
                proximity: &self.proximity,
                now,
            };
            for v in self.fleet.iter_mut() {
                let throttle = throttles.get(v.id.index()).copied().unwrap_or(Throttle::OPEN);
                step_vehicle(v, &throttle, &mut ctx, dt, &mut events);
            }
        }

        // ── Phase 5: metrics sample ───────────────────────────────────────
        self.metrics.absorb(&events);
        self.last_metrics = self.metrics.sample(&self.board, &self.fleet, now);
    }

    /// One proximity assessment per vehicle, from the tick-start position
    /// snapshot.  Throttles are advisory inputs to the state machine; the
    /// assessment itself mutates nothing, which is what makes the
    /// `parallel` feature safe.
    fn assess_throttles(&self) -> Vec<Throttle> {
        let positions = self.fleet.positions();
        let cfg = &self.proximity;
        let registry = &self.registry;

        let assess_one = |i: usize| {
            let pos = positions[i];
            let vehicles = positions
                .iter()
                .enumerate()
                .filter(move |&(j, _)| j != i)
                .map(|(_, &p)| p);
            if cfg.include_stations {
                let obstacles: Vec<Vec2> =
                    registry.stations_within(pos, cfg.sensor_radius).collect();
                assess(pos, vehicles.chain(obstacles), cfg)
            } else {
                assess(pos, vehicles, cfg)
            }
        };

        #[cfg(not(feature = "parallel"))]
        {
            (0..positions.len()).map(assess_one).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..positions.len()).into_par_iter().map(assess_one).collect()
        }
    }

    // ── External command surface ──────────────────────────────────────────

    /// Wake an idle vehicle into the dispatch loop.  A non-idle vehicle is
    /// left alone.
    pub fn activate(&mut self, vehicle: VehicleId) -> CoreResult<()> {
        let v = self
            .fleet
            .get_mut(vehicle)
            .ok_or(CoreError::VehicleNotFound(vehicle))?;
        if v.phase == Phase::Idle {
            v.phase = Phase::Translate;
        }
        Ok(())
    }

    /// Wake every idle vehicle.
    pub fn activate_all(&mut self) {
        for v in self.fleet.iter_mut() {
            if v.phase == Phase::Idle {
                v.phase = Phase::Translate;
            }
        }
    }

    /// Ask a vehicle to return to its garage after finishing its current
    /// delivery (immediately if it has none in flight).
    pub fn request_standby(&mut self, vehicle: VehicleId) -> CoreResult<()> {
        let v = self
            .fleet
            .get_mut(vehicle)
            .ok_or(CoreError::VehicleNotFound(vehicle))?;
        v.standby_requested = true;
        Ok(())
    }

    /// Manual trigger: hand the oldest waiting order to the first idle
    /// vehicle and send it off.  Returns the pairing, or `None` when there
    /// is no waiting order or no idle vehicle.
    pub fn dispatch_first_waiting(&mut self) -> Option<(OrderId, VehicleId)> {
        let order = self.board.peek_waiting()?;
        let vehicle = self.fleet.iter().find(|v| v.is_idle()).map(|v| v.id)?;

        self.board.mark_in_progress(order, vehicle);
        if let Some(pickup) = self.board.get(order).map(|o| o.pickup) {
            self.locks.try_acquire(pickup, vehicle);
        }
        if let Some(v) = self.fleet.get_mut(vehicle) {
            v.order = Some(order);
            v.phase = Phase::Translate;
        }
        Some((order, vehicle))
    }

    /// Set the global speed factor (0 pauses).
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.clock.set_speed_factor(factor);
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    // ── Read surface for the UI layer ─────────────────────────────────────

    /// One vehicle's full state (phase, pose, current order, …).
    pub fn vehicle(&self, vehicle: VehicleId) -> CoreResult<&Vehicle> {
        self.fleet
            .get(vehicle)
            .ok_or(CoreError::VehicleNotFound(vehicle))
    }

    /// The live order table in ID order.
    pub fn order_table(&self) -> Vec<&Order> {
        self.board.live_table()
    }

    /// The most recent per-tick metrics sample.
    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.last_metrics
    }
}
