//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `CoreError` via `From` impls, or keep them separate and wrap `CoreError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.
//!
//! Note the narrow scope: mid-tick simulation conditions (missing orders,
//! already-locked stations, …) are handled by in-place fallbacks and never
//! become errors.  `CoreError` covers the *edges* — construction, external
//! command validation, and I/O.

use thiserror::Error;

use crate::{StationId, VehicleId};

/// The top-level error type for `agv-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `agv-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
