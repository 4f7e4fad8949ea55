//! Simulation observer trait for progress reporting and data collection.

use agv_core::Tick;
use agv_fleet::FleetStore;
use agv_order::OrderBoard;

use crate::MetricsSnapshot;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, metrics: &MetricsSnapshot) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} delivered", metrics.delivered_count);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the freshly sampled metrics.
    fn on_tick_end(&mut self, _tick: Tick, _metrics: &MetricsSnapshot) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks).
    ///
    /// Provides read-only access to the fleet and the live order table so
    /// output writers can record state without the sim knowing about any
    /// specific output format.
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _fleet:    &FleetStore,
        _board:    &OrderBoard,
        _now_secs: f64,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
