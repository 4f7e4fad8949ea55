//! `agv-output` — simulation output backends.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`row`]      | Plain data rows (tick metrics, vehicle, order log)   |
//! | [`writer`]   | The `OutputWriter` trait                             |
//! | [`csv`]      | CSV backend (always available)                       |
//! | [`sqlite`]   | SQLite backend (feature `sqlite`)                    |
//! | [`parquet`]  | Parquet backend (feature `parquet`)                  |
//! | [`observer`] | `SimOutputObserver<W>` — `SimObserver` → writer      |
//! | [`error`]    | `OutputError`, `OutputResult<T>`                     |
//!
//! # Usage
//!
//! ```rust,ignore
//! let writer = CsvWriter::new(Path::new("output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "parquet")]
pub mod parquet;
#[cfg(feature = "sqlite")]
pub mod sqlite;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{OrderLogRow, TickMetricsRow, VehicleSnapshotRow};
pub use writer::OutputWriter;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteWriter;
