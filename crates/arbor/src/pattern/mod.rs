//! Path-pattern query language.
//!
//! Patterns select nodes of an array-indexed hierarchy whose components are
//! bare names or `name.i0.i1...`:
//!
//! | Segment | Matches |
//! |---|---|
//! | `name` | exactly `name` |
//! | `name[3]` | `name.3` |
//! | `name[[0,2]]` | `name.0` or `name.2` |
//! | `name[1:5:2]` | `name.1`, `name.3` |
//! | `name[2:]` | `name.2`, `name.3`, ... |
//! | `name[:]` | `name.<any digits>` |
//! | `*` | any one component |
//! | `...` | one or more components |
//!
//! Multi-dimensional components take one term per dimension:
//! `grid[0,:]` matches `grid.0.7`.

mod compile;
mod matcher;
mod parse;

pub use compile::CompiledPattern;
pub use parse::{IndexTerm, PathSegment, SegmentKind, SliceSpec, parse_path};
