//! Core traits for the row model.
//!
//! This module defines the interface views use to read and edit a model and
//! the signals a model emits when it changes.

use arbor_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// Flags indicating what operations are allowed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Cell can be selected.
    pub selectable: bool,
    /// Cell can be edited.
    pub editable: bool,
    /// Row can be dragged.
    pub drag_enabled: bool,
    /// Row can receive drops.
    pub drop_enabled: bool,
    /// Cell is enabled (can interact).
    pub enabled: bool,
}

impl ItemFlags {
    /// No flags at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Selectable and enabled.
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Selectable, enabled and editable.
    pub fn editable() -> Self {
        Self {
            editable: true,
            ..Self::new()
        }
    }

    /// Only accepts drops (the model root).
    pub fn drop_target() -> Self {
        Self {
            drop_enabled: true,
            ..Default::default()
        }
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the drag enabled flag.
    pub fn with_drag(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    /// Sets the drop enabled flag.
    pub fn with_drop(mut self, enabled: bool) -> Self {
        self.drop_enabled = enabled;
        self
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Column headers.
    Horizontal,
    /// Row headers.
    Vertical,
}

/// The interface views use to read and edit a hierarchical model.
///
/// At minimum, implement [`row_count`](ItemModel::row_count),
/// [`column_count`](ItemModel::column_count), [`data`](ItemModel::data),
/// [`index`](ItemModel::index), [`parent`](ItemModel::parent) and
/// [`signals`](ItemModel::signals). Editable models also implement
/// [`set_data`](ItemModel::set_data) and [`flags`](ItemModel::flags).
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the cell at index.
    ///
    /// Returns `ItemData::None` for invalid indices and unsupported roles.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    /// Sets the data for the given index and role.
    ///
    /// Returns `true` if the data was successfully set.
    /// The default implementation returns `false` (read-only).
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for the cell at the given index.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns header data for the given section. The default returns
    /// `ItemData::None`.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Sets header data. The default rejects every edit.
    fn set_header_data(
        &self,
        _section: usize,
        _orientation: Orientation,
        _value: ItemData,
        _role: ItemRole,
    ) -> bool {
        false
    }

    /// Returns the display text for a cell, if it is a string.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Creates a sibling index at the given row and column, validated
    /// against the model.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &index.parent())
    }
}

/// Collection of signals emitted by the hierarchy model.
///
/// - **Before modifications**: `rows_about_to_be_*` and `model_about_to_reset`
/// - **After modifications**: `rows_*` and `model_reset`
/// - **Cell changes**: `data_changed`
/// - **Store path changes**: `info_changed` for a renamed or moved group or
///   array row
/// - **Depth changes**: `depth_changed` with the new maximum item depth
/// - **Header changes**: `header_data_changed` after the root is renamed
///
/// Signals are emitted with no model lock held, so slots may query the
/// model.
pub struct ModelSignals {
    /// Emitted after rows have been inserted.
    /// Args: (parent index, first row, last row)
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted just before rows are removed.
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (parent index, first row, last row)
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted just before a row is moved.
    /// Args: (source parent, source first, source last, dest parent, dest row)
    pub rows_about_to_be_moved: Signal<(ModelIndex, usize, usize, ModelIndex, usize)>,

    /// Emitted after a row has been moved.
    /// Args: (source parent, source first, source last, dest parent, dest row)
    pub rows_moved: Signal<(ModelIndex, usize, usize, ModelIndex, usize)>,

    /// Emitted when cells change.
    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,

    /// Emitted when the store path behind a group or array row changes.
    pub info_changed: Signal<ModelIndex>,

    /// Emitted after a header section changed.
    /// Args: (orientation, first section, last section)
    pub header_data_changed: Signal<(Orientation, usize, usize)>,

    /// Emitted when the maximum item depth changes.
    pub depth_changed: Signal<usize>,

    /// Emitted before the tree is rebuilt.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after the tree has been rebuilt.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            rows_about_to_be_moved: Signal::new(),
            rows_moved: Signal::new(),
            data_changed: Signal::new(),
            info_changed: Signal::new(),
            header_data_changed: Signal::new(),
            depth_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits signals for row removal.
    ///
    /// Calls the provided function between the about_to_be_removed and
    /// removed signals.
    pub fn emit_rows_removed<F>(&self, parent: ModelIndex, first: usize, last: usize, remove_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_removed
            .emit((parent.clone(), first, last));
        remove_fn();
        self.rows_removed.emit((parent, first, last));
    }

    /// Emits signals for a one-row move.
    ///
    /// Calls the provided function between the about_to_be_moved and moved
    /// signals.
    pub fn emit_row_moved<F>(
        &self,
        source_parent: ModelIndex,
        source_row: usize,
        dest_parent: ModelIndex,
        dest_row: usize,
        move_fn: F,
    ) where
        F: FnOnce(),
    {
        self.rows_about_to_be_moved.emit((
            source_parent.clone(),
            source_row,
            source_row,
            dest_parent.clone(),
            dest_row,
        ));
        move_fn();
        self.rows_moved
            .emit((source_parent, source_row, source_row, dest_parent, dest_row));
    }

    /// Emits the data_changed signal for a single cell.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index.clone(), index, roles));
    }

    /// Emits signals for a model reset.
    ///
    /// Calls the provided function between the about_to_reset and reset
    /// signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }
}
