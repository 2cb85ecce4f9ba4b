//! Tree model over a hierarchy store.
//!
//! [`HierarchyModel`] mirrors the containers, arrays and (optionally)
//! attributes of a [`HierarchyStore`](crate::store::HierarchyStore) as rows
//! and keeps the store and the rows in step under rename, move, insert and
//! remove.
//!
//! # Core Types
//!
//! - `ModelIndex`: identifies a cell by row, column and parent
//! - `ItemRole`: what aspect of a cell is requested
//! - `ItemData`: the value of a cell
//! - `ItemModel`: the read/edit interface views use
//! - `ModelSignals`: change notifications
//!
//! # Rows
//!
//! | Row | Column 0 | Column 1 |
//! |---|---|---|
//! | group | name | none |
//! | array | name | `(d0, d1, ...) dtype` |
//! | attribute | map key or list position | value (leaf attributes only) |
//!
//! # Example
//!
//! ```
//! use arbor::model::{BuildOptions, HierarchyModel, ItemModel, ModelIndex};
//! use arbor::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! for channel in ["channel.0", "channel.1"] {
//!     let path = format!("run.0/{channel}/trace.0").parse().unwrap();
//!     store.require_leaf(&path, vec![100], "float64").unwrap();
//! }
//!
//! let options = BuildOptions::default().with_pattern("run[0]/channel[1:]/...");
//! let model = HierarchyModel::new(store, options).unwrap();
//!
//! let run = model.index(0, 0, &ModelIndex::invalid());
//! assert_eq!(model.row_count(&run), 1);
//!
//! model.signals().rows_inserted.connect(|(parent, first, last)| {
//!     println!("rows {first}..={last} inserted under {parent:?}");
//! });
//! assert!(model.insert_group(0, Some("notes"), &run));
//! ```

mod build;
mod dump;
mod edit;
mod index;
mod item;
mod role;
mod traits;
mod tree;
mod unique;

pub use build::BuildOptions;
pub use index::ModelIndex;
pub use item::ItemKind;
pub use role::{ItemData, ItemRole};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
pub use tree::{COLUMN_COUNT, HierarchyModel};
pub use unique::unique_key;
