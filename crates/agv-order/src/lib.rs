//! `agv-order` — package lifecycle and order dispatch.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`package`] | `Package`, `PackageState`, `PackageStore` (slots, grace purge) |
//! | [`order`]   | `Order`, `OrderStatus`                                         |
//! | [`board`]   | `OrderBoard` — spawn, priority selection, status transitions   |
//! | [`config`]  | `DispatchConfig`                                               |
//!
//! # Design notes
//!
//! Orders are created 1:1 with package spawns and live in a lookup map plus
//! a FIFO queue.  The two structures serve different access patterns:
//!
//! - the **map** answers "what is order N" for vehicles mid-delivery and for
//!   the live table;
//! - the **queue** preserves spawn order, which makes candidate evaluation
//!   in [`OrderBoard::select_next`] deterministic and gives the Pickup
//!   phase's fallback pull (`pop_waiting`) its oldest-first semantics.
//!
//! The only randomness in the whole core — the uniform dropoff draw — is
//! confined to [`OrderBoard::try_spawn`].

pub mod board;
pub mod config;
pub mod order;
pub mod package;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use board::OrderBoard;
pub use config::DispatchConfig;
pub use order::{Order, OrderStatus};
pub use package::{Package, PackageState, PackageStore};
