//! Simulation time model.
//!
//! # Design
//!
//! The scheduler runs a fixed cadence of **ticks**; each tick consumes one
//! wall-clock frame delta and converts it into scaled simulation seconds:
//!
//!   sim_dt = frame_dt * speed_factor
//!
//! The `Tick` counter is the canonical ordinal (exact, no floating-point
//! drift) and drives output cadence; `SimClock::now_secs` is the continuous
//! simulation timestamp consumed by dwell timers, spawn delays, and lock
//! cooldowns.  Pausing is a zero speed factor — the scheduler keeps ticking,
//! every component just receives `dt = 0`.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute scheduler tick counter.
///
/// Stored as `u64` to avoid overflow: at 30 ticks/second a u64 lasts ~19
/// billion years, far longer than any conceivable run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts wall-clock frame deltas into scaled simulation time.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Continuous simulation timestamp in seconds since start.
    pub now_secs: f64,
    /// Multiplier applied to every frame delta.  `0.0` means paused.
    pub speed_factor: f64,
    /// The current tick — advanced once per `advance()` call.
    pub current_tick: Tick,
    /// Factor restored by `resume()`; captured by `pause()`.
    resume_factor: f64,
}

impl SimClock {
    /// Create a clock at `t = 0` running at `speed_factor`.
    pub fn new(speed_factor: f64) -> Self {
        Self {
            now_secs: 0.0,
            speed_factor: speed_factor.max(0.0),
            current_tick: Tick::ZERO,
            resume_factor: if speed_factor > 0.0 { speed_factor } else { 1.0 },
        }
    }

    /// Consume one frame delta: advance the tick counter and the scaled
    /// timestamp, and return the simulation `dt` every component must use
    /// this tick.
    #[inline]
    pub fn advance(&mut self, frame_dt: f64) -> f64 {
        let dt = frame_dt.max(0.0) * self.speed_factor;
        self.now_secs += dt;
        self.current_tick = Tick(self.current_tick.0 + 1);
        dt
    }

    /// Set the speed multiplier.  Negative values clamp to 0 (paused).
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.speed_factor = factor.max(0.0);
        if self.speed_factor > 0.0 {
            self.resume_factor = self.speed_factor;
        }
    }

    /// Pause by zeroing the speed factor.  The scheduler keeps ticking.
    pub fn pause(&mut self) {
        if self.speed_factor > 0.0 {
            self.resume_factor = self.speed_factor;
        }
        self.speed_factor = 0.0;
    }

    /// Restore the speed factor captured by the last `pause()`.
    pub fn resume(&mut self) {
        if self.speed_factor == 0.0 {
            self.speed_factor = self.resume_factor;
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.speed_factor == 0.0
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s ×{})", self.current_tick, self.now_secs, self.speed_factor)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Domain knobs (spawn delays, motion speeds, lock cooldowns, sensor radii)
/// live in the config structs of their owning crates; this struct holds only
/// what the scheduler itself consumes.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Wall-clock seconds represented by one scheduler tick when running
    /// headless.  A UI host instead passes its measured frame delta to
    /// `Sim::step`.  Default: 1/30 s.
    pub frame_dt: f64,

    /// Initial speed factor.  `1.0` = real time, `0.0` = start paused.
    pub speed_factor: f64,

    /// Total ticks for `run()`.  For 10 simulated minutes at 30 ticks/s:
    /// 10 * 60 * 30 = 18 000.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical dropoff
    /// assignments (the only stochastic decision in the core).
    pub seed: u64,

    /// Fire the observer snapshot hook every N ticks.  1 = every tick.
    pub output_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which `run()` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.speed_factor)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_dt: 1.0 / 30.0,
            speed_factor: 1.0,
            total_ticks: 18_000,
            seed: 42,
            output_interval_ticks: 30,
        }
    }
}
