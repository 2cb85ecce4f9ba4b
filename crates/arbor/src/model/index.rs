//! Model index for addressing rows of the hierarchy model.
//!
//! A `ModelIndex` names a cell by row, column and parent index, and carries
//! the internal id of the tree item it refers to.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Represents a position within an [`ItemModel`](super::ItemModel).
///
/// The invalid index stands for the (hidden) model root: it is the parent of
/// top-level rows and what lookups return for out-of-range positions.
///
/// # Index Validity
///
/// Indices are snapshots. After rows are inserted, removed or moved a stored
/// index may point at a different row; re-derive indices after mutations.
///
/// # Example
///
/// ```
/// use arbor::model::ModelIndex;
///
/// let top = ModelIndex::with_internal_id(2, 0, ModelIndex::invalid(), 7);
/// let child = ModelIndex::with_internal_id(0, 1, top.clone(), 9);
///
/// assert_eq!(child.parent(), top);
/// assert_eq!(child.depth(), 1);
/// assert_eq!(child.sibling_at_column(0).column(), 0);
/// ```
#[derive(Clone)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    parent: Option<Arc<ModelIndex>>,
    /// Zero marks the invalid index.
    internal_id: u64,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates the invalid (root) index.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            parent: None,
            internal_id: 0,
        }
    }

    /// Creates an index for the item with the given (non-zero) internal id.
    ///
    /// Passing an `internal_id` of zero yields an invalid index.
    #[inline]
    pub fn with_internal_id(row: usize, column: usize, parent: ModelIndex, internal_id: u64) -> Self {
        if internal_id == 0 {
            return Self::invalid();
        }
        Self {
            row,
            column,
            parent: parent.is_valid().then(|| Arc::new(parent)),
            internal_id,
        }
    }

    /// Returns `true` unless this is the invalid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.internal_id != 0
    }

    /// The row within the parent. 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// The column. 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// The parent index; invalid for top-level rows.
    #[inline]
    pub fn parent(&self) -> ModelIndex {
        self.parent
            .as_deref()
            .cloned()
            .unwrap_or_else(ModelIndex::invalid)
    }

    /// Returns `true` if this index has a valid parent.
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// The id of the tree item this index refers to.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// The same item in another column.
    pub fn sibling_at_column(&self, column: usize) -> ModelIndex {
        if !self.is_valid() {
            return ModelIndex::invalid();
        }
        Self {
            column,
            ..self.clone()
        }
    }

    /// Number of valid ancestors. Top-level rows have depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent.as_deref();
        }
        depth
    }

    /// Ancestors from the immediate parent up to the top-level row.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent.as_deref();
        while let Some(parent) = current {
            ancestors.push(parent.clone());
            current = parent.parent.as_deref();
        }
        ancestors
    }

    /// Checks if `ancestor` is a proper ancestor of this index.
    pub fn is_descendant_of(&self, ancestor: &ModelIndex) -> bool {
        ancestor.is_valid() && self.ancestors().iter().any(|index| index == ancestor)
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("depth", &self.depth())
                .field("internal_id", &self.internal_id)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => true,
            (true, true) => {
                self.internal_id == other.internal_id
                    && self.row == other.row
                    && self.column == other.column
                    && self.parent() == other.parent()
            }
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.internal_id.hash(state);
        if self.is_valid() {
            self.row.hash(state);
            self.column.hash(state);
        }
    }
}

impl PartialOrd for ModelIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelIndex {
    /// Invalid first, then shallower before deeper, then by row and column.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => self
                .depth()
                .cmp(&other.depth())
                .then(self.row.cmp(&other.row))
                .then(self.column.cmp(&other.column))
                .then(self.internal_id.cmp(&other.internal_id)),
        }
    }
}
