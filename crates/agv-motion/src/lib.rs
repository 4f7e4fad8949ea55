//! `agv-motion` — vehicle motion control and the phase state machine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`profile`]   | `MotionProfile` — every speed, rate, and threshold as config  |
//! | [`control`]   | Heading clamp, pivot rotation, low-level steering helpers     |
//! | [`proximity`] | `ProximityConfig`, `Falloff`, `Throttle` — advisory slowdown  |
//! | [`event`]     | `StepEvent` — notifications emitted by a vehicle step         |
//! | [`machine`]   | `step_vehicle` — one authoritative transition fn per phase    |
//!
//! # Design notes
//!
//! The state machine is **advisory and self-correcting**: any step that
//! finds its preconditions missing (no order where one is expected, an empty
//! package slot, an unknown station) degrades to a default target or skips
//! forward in the cycle instead of faulting.  The proximity module never
//! moves a vehicle; it only scales and biases the motion the machine
//! computes.

pub mod control;
pub mod event;
pub mod machine;
pub mod profile;
pub mod proximity;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use event::StepEvent;
pub use machine::{StepCtx, step_vehicle};
pub use profile::MotionProfile;
pub use proximity::{Falloff, ProximityConfig, Throttle};
