//! The hierarchy tree model.
//!
//! `HierarchyModel` mirrors a [`HierarchyStore`] as rows of two columns (key
//! and value) and applies edits to the store before patching its items.

use parking_lot::{Mutex, RwLock};

use arbor_core::logging::targets;

use crate::error::{Result, StoreError, StoreResult};
use crate::store::{AttrKey, AttrValue, HierarchyPath, HierarchyStore};

use super::build::{BuildOptions, build_tree};
use super::index::ModelIndex;
use super::item::{ItemId, ItemKind, ItemStorage};
use super::role::{ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};

/// Number of columns: key and value.
pub const COLUMN_COUNT: usize = 2;

/// A two-column tree model over a hierarchy store.
///
/// Column 0 holds the key of a row (node name, map key or list position),
/// column 1 its value (array shape and dtype, or a leaf attribute value).
/// The model owns its store; edits go through the model so the rows and the
/// store stay in step.
///
/// # Locking
///
/// The store and the item forest sit behind separate `RwLock`s, always
/// acquired store first. No lock is held while signals are emitted.
///
/// # Example
///
/// ```
/// use arbor::model::{BuildOptions, HierarchyModel, ItemModel, ModelIndex};
/// use arbor::store::MemoryStore;
///
/// let mut store = MemoryStore::new();
/// store.require_leaf(&"run.0/trace.0".parse().unwrap(), vec![1000], "float64").unwrap();
///
/// let model = HierarchyModel::new(store, BuildOptions::default()).unwrap();
/// let run = model.index(0, 0, &ModelIndex::invalid());
/// let trace_value = model.index(0, 1, &run);
///
/// assert_eq!(model.display_text(&run).as_deref(), Some("run.0"));
/// assert_eq!(model.display_text(&trace_value).as_deref(), Some("(1000,) float64"));
/// ```
pub struct HierarchyModel<S> {
    pub(crate) store: RwLock<S>,
    pub(crate) storage: RwLock<ItemStorage>,
    pub(crate) options: RwLock<BuildOptions>,
    depth: Mutex<usize>,
    pub(crate) signals: ModelSignals,
}

impl<S: HierarchyStore> HierarchyModel<S> {
    /// Build a model over `store`.
    ///
    /// # Errors
    ///
    /// Fails if the root in `options` does not exist or its pattern does
    /// not parse.
    pub fn new(store: S, options: BuildOptions) -> Result<Self> {
        let storage = build_tree(&store, &options)?;
        let depth = storage.max_depth();
        Ok(Self {
            store: RwLock::new(store),
            storage: RwLock::new(storage),
            options: RwLock::new(options),
            depth: Mutex::new(depth),
            signals: ModelSignals::new(),
        })
    }

    /// Run `f` with shared access to the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.read())
    }

    /// Give up the model and return its store.
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    /// The options the current tree was built with.
    pub fn options(&self) -> BuildOptions {
        self.options.read().clone()
    }

    /// Rebuild the tree with new options.
    ///
    /// # Errors
    ///
    /// Fails, leaving the model untouched, if the new root does not exist or
    /// the pattern does not parse.
    pub fn reset(&self, options: BuildOptions) -> Result<()> {
        let storage = build_tree(&*self.store.read(), &options)?;
        self.signals.emit_reset(|| {
            *self.storage.write() = storage;
            *self.options.write() = options;
        });
        self.refresh_depth();
        Ok(())
    }

    /// Rebuild with a new path filter, keeping the other options.
    ///
    /// # Errors
    ///
    /// Returns the pattern error if `pattern` does not parse.
    pub fn set_pattern(&self, pattern: Option<&str>) -> Result<()> {
        let mut options = self.options();
        options.pattern = pattern.map(str::to_string);
        self.reset(options)
    }

    /// The greatest depth of any row; top-level rows have depth 1 and an
    /// empty model depth 0.
    pub fn max_depth(&self) -> usize {
        self.storage.read().max_depth()
    }

    /// What the row at `index` stands for.
    pub fn item_kind(&self, index: &ModelIndex) -> Option<ItemKind> {
        let storage = self.storage.read();
        let id = resolve_item(&storage, index)?;
        storage.kind(id).cloned()
    }

    /// The store path behind a group or array row.
    pub fn item_path(&self, index: &ModelIndex) -> Option<HierarchyPath> {
        let storage = self.storage.read();
        let id = resolve_item(&storage, index)?;
        storage.node_path(id).cloned()
    }

    /// For an attribute row, the path of the node owning the attribute and
    /// the keys from its attribute table down to the row.
    pub fn attr_chain(&self, index: &ModelIndex) -> Option<(HierarchyPath, Vec<AttrKey>)> {
        let storage = self.storage.read();
        let id = resolve_item(&storage, index)?;
        attr_location(&storage, id)
    }

    /// The current value of an attribute row, read from the store.
    pub fn attr_value(&self, index: &ModelIndex) -> Option<AttrValue> {
        let store = self.store.read();
        let storage = self.storage.read();
        let id = resolve_item(&storage, index)?;
        let (owner, keys) = attr_location(&storage, id)?;
        read_attr(&*store, &owner, &keys).ok()
    }

    /// Store paths of the group and array rows at and under `index`, in
    /// pre-order. The invalid index stands for the whole tree.
    pub fn subtree_paths(
        &self,
        index: &ModelIndex,
        include_groups: bool,
        include_arrays: bool,
    ) -> Vec<HierarchyPath> {
        let storage = self.storage.read();
        let Some(id) = resolve(&storage, index) else {
            return Vec::new();
        };
        storage
            .subtree(id)
            .into_iter()
            .filter_map(|item| storage.kind(item))
            .filter(|kind| {
                (include_groups && kind.is_group()) || (include_arrays && kind.is_array())
            })
            .filter_map(|kind| kind.node_path().cloned())
            .collect()
    }

    /// The column-0 index of the row showing the node at `path`; invalid if
    /// no row shows it.
    pub fn index_for_path(&self, path: &HierarchyPath) -> ModelIndex {
        let storage = self.storage.read();
        storage
            .subtree(storage.root())
            .into_iter()
            .find(|&id| id != storage.root() && storage.node_path(id) == Some(path))
            .map_or_else(ModelIndex::invalid, |id| create_index(&storage, id, 0))
    }

    /// Emit `depth_changed` if the maximum depth moved since the last check.
    pub(crate) fn refresh_depth(&self) {
        let depth = self.storage.read().max_depth();
        let changed = {
            let mut last = self.depth.lock();
            let changed = *last != depth;
            *last = depth;
            changed
        };
        if changed {
            tracing::debug!(target: targets::MODEL, depth, "max depth changed");
            self.signals.depth_changed.emit(depth);
        }
    }

    fn value_data(&self, store: &S, storage: &ItemStorage, id: ItemId) -> ItemData {
        match storage.kind(id) {
            Some(ItemKind::Array(path)) => store
                .node(path)
                .ok()
                .and_then(|info| info.summary())
                .into(),
            Some(ItemKind::Attr(_)) if storage.child_count(id) == 0 => attr_location(storage, id)
                .and_then(|(owner, keys)| read_attr(store, &owner, &keys).ok())
                .map_or(ItemData::None, |value| ItemData::from(&value)),
            _ => ItemData::None,
        }
    }
}

impl<S: HierarchyStore + Send + Sync> ItemModel for HierarchyModel<S> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() && parent.column() > 0 {
            return 0;
        }
        let storage = self.storage.read();
        resolve(&storage, parent).map_or(0, |id| storage.child_count(id))
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        COLUMN_COUNT
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() {
            return ItemData::None;
        }
        let store = self.store.read();
        let storage = self.storage.read();
        let Some(id) = resolve_item(&storage, index) else {
            return ItemData::None;
        };
        let Some(kind) = storage.kind(id) else {
            return ItemData::None;
        };

        match role {
            ItemRole::ToolTip => kind
                .node_path()
                .map_or(ItemData::None, |path| ItemData::String(path.to_string())),
            ItemRole::Display | ItemRole::Edit => match index.column() {
                0 => key_data(kind),
                1 => self.value_data(&store, &storage, id),
                _ => ItemData::None,
            },
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= COLUMN_COUNT || (parent.is_valid() && parent.column() != 0) {
            return ModelIndex::invalid();
        }
        let storage = self.storage.read();
        let Some(parent_id) = resolve(&storage, parent) else {
            return ModelIndex::invalid();
        };
        match storage.child_at(parent_id, row) {
            Some(child) => ModelIndex::with_internal_id(row, column, parent.clone(), child.to_raw()),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let storage = self.storage.read();
        let Some(id) = resolve_item(&storage, index) else {
            return ModelIndex::invalid();
        };
        storage
            .parent_of(id)
            .map_or_else(ModelIndex::invalid, |parent| create_index(&storage, parent, 0))
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        if role != ItemRole::Edit {
            return false;
        }
        match index.column() {
            0 => self.set_key(index, &value.to_text()),
            1 => self.set_value(index, value.into()),
            _ => false,
        }
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if !index.is_valid() {
            return ItemFlags::drop_target();
        }
        let store = self.store.read();
        let storage = self.storage.read();
        let Some(id) = resolve_item(&storage, index) else {
            return ItemFlags::none();
        };
        let Some(kind) = storage.kind(id) else {
            return ItemFlags::none();
        };

        match (index.column(), kind) {
            (0, ItemKind::Group(_) | ItemKind::Array(_)) => {
                ItemFlags::editable().with_drag(true).with_drop(true)
            }
            (0, ItemKind::Attr(AttrKey::Index(_))) => ItemFlags::new(),
            (0, ItemKind::Attr(AttrKey::Key(_))) => ItemFlags::editable(),
            (1, ItemKind::Array(_)) => ItemFlags::editable(),
            (1, ItemKind::Attr(_)) => {
                let scalar = storage.child_count(id) == 0
                    && attr_location(&storage, id)
                        .and_then(|(owner, keys)| read_attr(&*store, &owner, &keys).ok())
                        .is_some_and(|value| value.is_scalar());
                if scalar {
                    ItemFlags::editable()
                } else {
                    ItemFlags::none()
                }
            }
            _ => ItemFlags::none(),
        }
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if orientation != Orientation::Horizontal || role != ItemRole::Display {
            return ItemData::None;
        }
        let store = self.store.read();
        let storage = self.storage.read();
        let root = storage.root();
        match section {
            0 => match storage.kind(root).map(ItemKind::key_text) {
                Some(name) if !name.is_empty() => ItemData::String(name),
                _ => ItemData::from("/"),
            },
            1 => self.value_data(&store, &storage, root),
            _ => ItemData::None,
        }
    }

    fn set_header_data(
        &self,
        section: usize,
        orientation: Orientation,
        value: ItemData,
        role: ItemRole,
    ) -> bool {
        if orientation != Orientation::Horizontal || role != ItemRole::Edit || section != 0 {
            return false;
        }
        self.rename_root(&value.to_text())
    }
}

fn key_data(kind: &ItemKind) -> ItemData {
    match kind {
        ItemKind::Attr(AttrKey::Index(index)) => {
            i64::try_from(*index).map_or(ItemData::None, ItemData::Int)
        }
        other => ItemData::String(other.key_text()),
    }
}

/// The item an index refers to; the invalid index is the root.
pub(crate) fn resolve(storage: &ItemStorage, index: &ModelIndex) -> Option<ItemId> {
    if !index.is_valid() {
        return Some(storage.root());
    }
    resolve_item(storage, index)
}

/// The item a valid index refers to, if it is still alive.
pub(crate) fn resolve_item(storage: &ItemStorage, index: &ModelIndex) -> Option<ItemId> {
    if !index.is_valid() {
        return None;
    }
    let id = ItemId::from_raw(index.internal_id());
    storage.get(id).map(|_| id)
}

/// A fresh index for `id`; the root maps to the invalid index.
pub(crate) fn create_index(storage: &ItemStorage, id: ItemId, column: usize) -> ModelIndex {
    let (Some(parent), Some(row)) = (storage.parent_of(id), storage.row_of(id)) else {
        return ModelIndex::invalid();
    };
    let parent_index = create_index(storage, parent, 0);
    ModelIndex::with_internal_id(row, column, parent_index, id.to_raw())
}

/// Owner path and key chain of an attribute item.
pub(crate) fn attr_location(
    storage: &ItemStorage,
    id: ItemId,
) -> Option<(HierarchyPath, Vec<AttrKey>)> {
    let (owner, keys) = storage.attr_chain(id)?;
    let path = storage.node_path(owner)?.clone();
    Some((path, keys))
}

fn chain_text(keys: &[AttrKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

fn top_level_key<'k>(owner: &HierarchyPath, keys: &'k [AttrKey]) -> StoreResult<(&'k str, &'k [AttrKey])> {
    let (first, rest) = keys
        .split_first()
        .ok_or_else(|| StoreError::attr_not_found(owner, ""))?;
    let name = first
        .as_key()
        .ok_or_else(|| StoreError::attr_not_found(owner, first))?;
    Ok((name, rest))
}

/// Read the value at the end of a key chain.
pub(crate) fn read_attr<S: HierarchyStore + ?Sized>(
    store: &S,
    owner: &HierarchyPath,
    keys: &[AttrKey],
) -> StoreResult<AttrValue> {
    let (name, rest) = top_level_key(owner, keys)?;
    store
        .get_attr(owner, name)?
        .get_path(rest)
        .cloned()
        .ok_or_else(|| StoreError::attr_not_found(owner, chain_text(keys)))
}

/// Read the top-level attribute named by `keys[0]`, apply `edit` to the
/// value at the end of the chain and write the whole attribute back.
///
/// Nothing is written when `edit` returns `false`.
pub(crate) fn modify_attr<S, F>(
    store: &mut S,
    owner: &HierarchyPath,
    keys: &[AttrKey],
    edit: F,
) -> StoreResult<bool>
where
    S: HierarchyStore + ?Sized,
    F: FnOnce(&mut AttrValue) -> bool,
{
    let (name, rest) = top_level_key(owner, keys)?;
    let mut top = store.get_attr(owner, name)?;
    let target = top
        .get_path_mut(rest)
        .ok_or_else(|| StoreError::attr_not_found(owner, chain_text(keys)))?;
    if !edit(target) {
        return Ok(false);
    }
    store.set_attr(owner, name, top)?;
    Ok(true)
}
