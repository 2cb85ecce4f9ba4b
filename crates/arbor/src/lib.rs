//! Arbor - path-pattern selection and a synchronized tree model over
//! hierarchical array stores.
//!
//! A store holds named containers and n-dimensional leaf arrays whose
//! components are bare names or `name.index`. Arbor provides:
//!
//! - [`pattern`]: a query language (`run[0]/sweep[:]/channel[1:]/...`)
//!   compiled into a two-phase matcher
//! - [`select`]: pre-order selection of store nodes by name or pattern
//! - [`model`]: a two-column tree model that mirrors a store, including
//!   nested attribute values, and applies renames, moves, inserts and
//!   removals to both
//! - [`store`]: the store interface and an in-memory store with JSON
//!   snapshots
//!
//! # Example
//!
//! ```
//! use arbor::model::{BuildOptions, HierarchyModel, ItemModel, ModelIndex};
//! use arbor::store::{HierarchyPath, MemoryStore};
//!
//! fn main() -> arbor::Result<()> {
//!     let mut store = MemoryStore::new();
//!     for sweep in 0..2 {
//!         for channel in 0..3 {
//!             let path: HierarchyPath = format!("run.0/sweep.{sweep}/channel.{channel}/ydata").parse()?;
//!             store.require_leaf(&path, vec![1000], "float64")?;
//!         }
//!     }
//!
//!     let options = BuildOptions::default().with_pattern("run[0]/sweep[:]/channel[1:]");
//!     let model = HierarchyModel::new(store, options)?;
//!
//!     let run = model.index(0, 0, &ModelIndex::invalid());
//!     let sweep = model.index(0, 0, &run);
//!     assert_eq!(model.row_count(&sweep), 2);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod pattern;
pub mod select;
pub mod store;

pub use arbor_core::{Signal, TreeFormatOptions, TreeStyle};
pub use config::ViewerConfig;
pub use error::{ConfigError, Error, PatternError, Result, StoreError};
pub use model::{BuildOptions, HierarchyModel};
pub use pattern::CompiledPattern;
pub use select::Selector;
