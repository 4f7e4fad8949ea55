//! `agv-sim` — the tick-loop scheduler.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`sim`]      | `Sim` — the tick loop and external command surface         |
//! | [`builder`]  | `SimBuilder` — validating fluent construction              |
//! | [`metrics`]  | `MetricsAggregator`, `MetricsSnapshot`                     |
//! | [`observer`] | `SimObserver` trait, `NoopObserver`                        |
//! | [`error`]    | `SimError`, `SimResult<T>`                                 |
//!
//! # The tick
//!
//! One `Sim::step(frame_dt)` runs, in order:
//!
//! 1. **Clock**: scale the frame delta by the speed factor.
//! 2. **Spawn pass**: every pickup station gets a `try_spawn` check — before
//!    any vehicle steps, so a just-spawned order is assignable in the same
//!    tick it appears.
//! 3. **Purge pass**: deposited packages and delivered orders past their
//!    grace windows are removed.
//! 4. **Proximity pass**: per-vehicle throttle assessment from the
//!    tick-start position snapshot (parallel with the `parallel` feature —
//!    it is read-only).
//! 5. **Vehicle steps**: each vehicle's state machine, sequentially in
//!    `VehicleId` order.  Lock claims and queue pops made by earlier
//!    vehicles are visible to later ones within the tick.
//! 6. **Metrics sample**: absorb step events and refresh the per-tick
//!    snapshot.
//!
//! No step blocks: a vehicle waiting on a locked station or an empty queue
//! performs a no-op step and re-polls next tick.

pub mod builder;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use metrics::{MetricsAggregator, MetricsSnapshot};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
