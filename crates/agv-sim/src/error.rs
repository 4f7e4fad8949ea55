//! Error types for agv-sim.

use thiserror::Error;

use agv_core::CoreError;

/// Errors surfaced at the edges of the simulation: construction and external
/// command validation.  Nothing mid-tick ever raises.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("layout has no garage slots; a fleet needs at least one")]
    NoGarages,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
