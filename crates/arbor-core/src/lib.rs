//! Core systems for Arbor.
//!
//! This crate provides the foundational pieces shared by the Arbor crates:
//!
//! - **Signal/Slot System**: Type-safe change notification between a model
//!   and the views attached to it
//! - **Logging**: `tracing` target names, tree formatting options and
//!   performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! let depth_changed = Signal::<usize>::new();
//!
//! let conn_id = depth_changed.connect(|depth| {
//!     println!("tree is now {} levels deep", depth);
//! });
//!
//! depth_changed.emit(5);
//! depth_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
