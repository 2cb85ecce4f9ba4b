//! Structural edits: rename, move, insert and remove.
//!
//! Every edit changes the store first. When the store rejects the change the
//! items are left untouched and the edit reports `false`. Signals are emitted
//! after the locks are released.

use arbor_core::logging::targets;

use crate::error::{StoreError, StoreResult};
use crate::store::{AttrKey, AttrValue, HierarchyPath, HierarchyStore};

use super::build::attach_value;
use super::index::ModelIndex;
use super::item::{ItemId, ItemKind, ItemStorage};
use super::role::ItemRole;
use super::traits::Orientation;
use super::tree::{
    HierarchyModel, attr_location, create_index, modify_attr, read_attr, resolve, resolve_item,
};
use super::unique::unique_key;

const NEW_GROUP: &str = "new_group";
const NEW_ARRAY: &str = "new_array";
const NEW_ATTR: &str = "new_attr";

/// A new leaf array to create.
struct LeafSpec<'a> {
    shape: Vec<u64>,
    dtype: &'a str,
}

/// Trim whitespace and surrounding `/` from a node name; `None` if nothing
/// usable is left.
fn clean_node_name(key: &str) -> Option<&str> {
    let name = key.trim().trim_matches('/');
    (!name.is_empty() && !name.contains('/')).then_some(name)
}

impl<S: HierarchyStore> HierarchyModel<S> {
    /// Rename the row at `index`.
    ///
    /// Groups and arrays are renamed in the store and every cached path in
    /// their subtree is rewritten. Map-key attributes move their value to
    /// the new key, which goes to the end of the map. The new key is made
    /// unique among the siblings.
    ///
    /// Returns `false` for list positions, names containing `/`, a name that
    /// resolves to the current one, or a store failure.
    pub fn set_key(&self, index: &ModelIndex, key: &str) -> bool {
        let renamed_node = {
            let mut store = self.store.write();
            let mut storage = self.storage.write();
            let Some(id) = resolve_item(&storage, index) else {
                return false;
            };
            let Some(kind) = storage.kind(id).cloned() else {
                return false;
            };
            let renamed = match &kind {
                ItemKind::Group(old) | ItemKind::Array(old) => {
                    rename_node(&mut *store, &mut storage, id, old, key)
                }
                ItemKind::Attr(_) => rename_attr(&mut *store, &mut storage, id, key),
            };
            if !renamed {
                return false;
            }
            kind.is_node()
        };

        self.signals
            .emit_data_changed_single(index.clone(), vec![ItemRole::Display, ItemRole::Edit]);
        if renamed_node {
            self.signals.info_changed.emit(index.sibling_at_column(0));
        }
        true
    }

    /// Rename the node the model is rooted at; the header edit.
    ///
    /// The store root has no name and is never renamed. Later rebuilds
    /// start from the renamed node.
    pub fn rename_root(&self, key: &str) -> bool {
        let renamed = {
            let mut store = self.store.write();
            let mut storage = self.storage.write();
            let root = storage.root();
            let Some(ItemKind::Group(old) | ItemKind::Array(old)) = storage.kind(root).cloned()
            else {
                return false;
            };
            let Some(parent_path) = old.parent() else {
                tracing::debug!(target: targets::MODEL, "store root cannot be renamed");
                return false;
            };
            let Some(name) = clean_node_name(key) else {
                return false;
            };
            let taken: Vec<String> = store
                .children(&parent_path)
                .unwrap_or_default()
                .into_iter()
                .filter(|child| Some(child.as_str()) != old.name())
                .collect();
            let Ok(new) = parent_path.join(&unique_key(name, &taken)) else {
                return false;
            };
            if new == old {
                return false;
            }
            if let Err(error) = store.rename(&old, &new) {
                tracing::warn!(target: targets::MODEL, from = %old, to = %new, %error, "store rename failed");
                return false;
            }
            storage.rebase_paths(root, &old, &new);
            tracing::debug!(target: targets::MODEL, from = %old, to = %new, "renamed root");
            new
        };
        self.options.write().root = renamed;
        self.signals
            .header_data_changed
            .emit((Orientation::Horizontal, 0, 0));
        true
    }

    /// Write a leaf attribute value; the column-1 edit.
    ///
    /// Only scalar attributes take scalar values; arrays, groups, lists and
    /// maps (even empty ones) are rejected, as `flags` reports.
    pub fn set_value(&self, index: &ModelIndex, value: AttrValue) -> bool {
        if !value.is_scalar() {
            return false;
        }
        {
            let store = self.store.read();
            let storage = self.storage.read();
            let Some(id) = resolve_item(&storage, index) else {
                return false;
            };
            let scalar = matches!(storage.kind(id), Some(ItemKind::Attr(_)))
                && storage.child_count(id) == 0
                && attr_location(&storage, id)
                    .and_then(|(owner, keys)| read_attr(&*store, &owner, &keys).ok())
                    .is_some_and(|current| current.is_scalar());
            if !scalar {
                tracing::debug!(target: targets::MODEL, ?index, "value column not writable");
                return false;
            }
        }
        self.set_attr(index, value)
    }

    /// Replace the value of the attribute row at `index`.
    ///
    /// Nested values are written back through their top-level attribute.
    /// Child rows are rebuilt from the new value.
    pub fn set_attr(&self, index: &ModelIndex, value: impl Into<AttrValue>) -> bool {
        let value = value.into();
        let (id, old_children) = {
            let mut store = self.store.write();
            let storage = self.storage.read();
            let Some(id) = resolve_item(&storage, index) else {
                return false;
            };
            let Some((owner, keys)) = attr_location(&storage, id) else {
                return false;
            };
            let written = modify_attr(&mut *store, &owner, &keys, |target| {
                *target = value.clone();
                true
            });
            if let Err(error) = written {
                tracing::warn!(target: targets::MODEL, path = %owner, %error, "attribute write failed");
                return false;
            }
            (id, storage.children_of(id).to_vec())
        };

        let row_index = index.sibling_at_column(0);
        if !old_children.is_empty() {
            self.signals
                .emit_rows_removed(row_index.clone(), 0, old_children.len() - 1, || {
                    let mut storage = self.storage.write();
                    for child in old_children {
                        storage.remove_subtree(child);
                    }
                });
        }
        let new_rows = {
            let mut storage = self.storage.write();
            attach_value(&mut storage, id, &value);
            storage.child_count(id)
        };
        if new_rows > 0 {
            self.signals
                .rows_inserted
                .emit((row_index.clone(), 0, new_rows - 1));
        }

        self.signals.emit_data_changed_single(
            row_index.sibling_at_column(1),
            vec![ItemRole::Display, ItemRole::Edit],
        );
        self.refresh_depth();
        true
    }

    /// Move a group or array row under another group.
    ///
    /// `position` is the destination row; `None` appends. Rejected when the
    /// destination is not a group, is the current parent or lies inside the
    /// moved subtree, or already has a child of the same name.
    pub fn move_to(
        &self,
        index: &ModelIndex,
        destination: &ModelIndex,
        position: Option<usize>,
    ) -> bool {
        let (id, dest_id, row, dest_row, from, to) = {
            let mut store = self.store.write();
            let storage = self.storage.read();
            let Some(id) = resolve_item(&storage, index) else {
                return false;
            };
            let Some(dest_id) = resolve(&storage, destination) else {
                return false;
            };
            let Some(from) = storage.kind(id).and_then(ItemKind::node_path).cloned() else {
                tracing::debug!(target: targets::MODEL, "only groups and arrays move");
                return false;
            };
            let Some(ItemKind::Group(dest_path)) = storage.kind(dest_id) else {
                tracing::debug!(target: targets::MODEL, "move destination is not a group");
                return false;
            };
            let (Some(parent), Some(row)) = (storage.parent_of(id), storage.row_of(id)) else {
                return false;
            };
            if parent == dest_id || storage.is_within(dest_id, id) {
                tracing::debug!(target: targets::MODEL, path = %from, "move rejected");
                return false;
            }
            let Some(name) = from.name() else {
                return false;
            };
            if storage
                .sibling_keys(dest_id, false, None)
                .iter()
                .any(|taken| taken == name)
            {
                tracing::debug!(target: targets::MODEL, path = %from, "move would collide");
                return false;
            }
            let Ok(to) = dest_path.join(name) else {
                return false;
            };
            if let Err(error) = store.rename(&from, &to) {
                tracing::warn!(target: targets::MODEL, from = %from, to = %to, %error, "store move failed");
                return false;
            }
            let count = storage.child_count(dest_id);
            let dest_row = position.unwrap_or(count).min(count);
            (id, dest_id, row, dest_row, from, to)
        };

        let (source_parent, dest_parent) = {
            let storage = self.storage.read();
            (
                self.parent_index(&storage, id),
                create_index(&storage, dest_id, 0),
            )
        };
        self.signals
            .emit_row_moved(source_parent, row, dest_parent, dest_row, || {
                let mut storage = self.storage.write();
                storage.detach(id);
                storage.reattach(id, dest_id, dest_row);
                storage.rebase_paths(id, &from, &to);
            });
        tracing::debug!(target: targets::MODEL, from = %from, to = %to, "moved row");

        let moved = create_index(&self.storage.read(), id, 0);
        self.signals.info_changed.emit(moved);
        self.refresh_depth();
        true
    }

    /// Row-level move: the row at `source_row` under `source_parent` goes to
    /// `destination_child` under `destination_parent`, `-1` appending.
    pub fn move_row(
        &self,
        source_parent: &ModelIndex,
        source_row: usize,
        destination_parent: &ModelIndex,
        destination_child: isize,
    ) -> bool {
        if source_parent == destination_parent {
            return false;
        }
        let source = {
            let storage = self.storage.read();
            let Some(parent) = resolve(&storage, source_parent) else {
                return false;
            };
            let Some(dest) = resolve(&storage, destination_parent) else {
                return false;
            };
            let dest_count = storage.child_count(dest) as isize;
            if destination_child < -1 || destination_child > dest_count {
                return false;
            }
            match storage.child_at(parent, source_row) {
                Some(child) => create_index(&storage, child, 0),
                None => return false,
            }
        };
        self.move_to(&source, destination_parent, usize::try_from(destination_child).ok())
    }

    /// Create a group in the store and insert its row at `position` under
    /// the group row `parent`.
    pub fn insert_group(&self, position: usize, key: Option<&str>, parent: &ModelIndex) -> bool {
        self.insert_node(position, key.unwrap_or(NEW_GROUP), None, parent)
    }

    /// Create a leaf array in the store and insert its row at `position`
    /// under the group row `parent`.
    pub fn insert_array(
        &self,
        position: usize,
        key: Option<&str>,
        shape: Vec<u64>,
        dtype: &str,
        parent: &ModelIndex,
    ) -> bool {
        self.insert_node(
            position,
            key.unwrap_or(NEW_ARRAY),
            Some(LeafSpec { shape, dtype }),
            parent,
        )
    }

    fn insert_node(
        &self,
        position: usize,
        key: &str,
        leaf: Option<LeafSpec<'_>>,
        parent: &ModelIndex,
    ) -> bool {
        {
            let mut store = self.store.write();
            let mut storage = self.storage.write();
            let Some(parent_id) = resolve(&storage, parent) else {
                return false;
            };
            let Some(ItemKind::Group(parent_path)) = storage.kind(parent_id).cloned() else {
                tracing::debug!(target: targets::MODEL, "insert parent is not a group");
                return false;
            };
            if position > storage.child_count(parent_id) {
                return false;
            }
            let Some(name) = clean_node_name(key) else {
                return false;
            };
            let mut taken = storage.sibling_keys(parent_id, false, None);
            taken.extend(store.children(&parent_path).unwrap_or_default());
            let Ok(path) = parent_path.join(&unique_key(name, &taken)) else {
                return false;
            };

            let created = match &leaf {
                Some(spec) => store.create_leaf(&path, spec.shape.clone(), spec.dtype),
                None => store.create_container(&path),
            };
            if let Err(error) = created {
                tracing::warn!(target: targets::MODEL, path = %path, %error, "store insert failed");
                return false;
            }
            let kind = if leaf.is_some() {
                ItemKind::Array(path)
            } else {
                ItemKind::Group(path)
            };
            if storage.add_child(parent_id, kind, Some(position)).is_none() {
                return false;
            }
        }

        self.signals
            .rows_inserted
            .emit((parent.clone(), position, position));
        self.refresh_depth();
        true
    }

    /// Insert an attribute row at `position` under `parent`.
    ///
    /// Under a group or array, or a map attribute, the value is stored
    /// under `key` (default `new_attr`) made unique among the siblings.
    /// Under a list attribute it is inserted at `position` and the later
    /// positions shift up by one. Scalars cannot receive children.
    pub fn insert_attribute(
        &self,
        position: usize,
        key: Option<&str>,
        value: impl Into<AttrValue>,
        parent: &ModelIndex,
    ) -> bool {
        let value = value.into();
        {
            let mut store = self.store.write();
            let mut storage = self.storage.write();
            let Some(parent_id) = resolve(&storage, parent) else {
                return false;
            };
            if position > storage.child_count(parent_id) {
                return false;
            }
            let key = key.unwrap_or(NEW_ATTR).trim();
            let new_key = match insert_attr_value(&mut *store, &storage, parent_id, position, key, &value)
            {
                Ok(Some(new_key)) => new_key,
                Ok(None) => {
                    tracing::debug!(target: targets::MODEL, key, "attribute insert rejected");
                    return false;
                }
                Err(error) => {
                    tracing::warn!(target: targets::MODEL, key, %error, "attribute insert failed");
                    return false;
                }
            };

            if matches!(new_key, AttrKey::Index(_)) {
                storage.shift_indices(parent_id, position, 1);
            }
            let Some(child) = storage.add_child(parent_id, ItemKind::Attr(new_key), Some(position))
            else {
                return false;
            };
            attach_value(&mut storage, child, &value);
        }

        self.signals
            .rows_inserted
            .emit((parent.clone(), position, position));
        self.refresh_depth();
        true
    }

    /// Remove `count` rows starting at `position` under `parent`, deleting
    /// what they stand for from the store.
    ///
    /// Removing list elements shifts the later positions down. The model
    /// root keeps at least one row. Returns `true` only if every row was
    /// removed.
    pub fn remove_rows(&self, position: usize, count: usize, parent: &ModelIndex) -> bool {
        if count == 0 {
            return false;
        }
        let (parent_id, removed) = {
            let mut store = self.store.write();
            let storage = self.storage.read();
            let Some(parent_id) = resolve(&storage, parent) else {
                return false;
            };
            let total = storage.child_count(parent_id);
            let Some(end) = position.checked_add(count).filter(|&end| end <= total) else {
                tracing::debug!(target: targets::MODEL, position, count, total, "remove out of range");
                return false;
            };
            if parent_id == storage.root() && count == total {
                tracing::debug!(target: targets::MODEL, "refusing to empty the model");
                return false;
            }

            let mut removed = Vec::new();
            for &item in &storage.children_of(parent_id)[position..end] {
                match delete_backing(&mut *store, &storage, item, position) {
                    Ok(()) => removed.push(item),
                    Err(error) => {
                        tracing::warn!(target: targets::MODEL, %error, "store delete failed");
                        break;
                    }
                }
            }
            (parent_id, removed)
        };

        if removed.is_empty() {
            return false;
        }
        let complete = removed.len() == count;
        let last = position + removed.len() - 1;
        self.signals
            .emit_rows_removed(parent.clone(), position, last, || {
                let mut storage = self.storage.write();
                let shift = removed.len() as isize;
                for item in removed {
                    storage.remove_subtree(item);
                }
                storage.shift_indices(parent_id, position, -shift);
            });
        self.refresh_depth();
        complete
    }

    /// Columns are fixed; always `false`.
    pub fn insert_columns(&self, _position: usize, _count: usize, _parent: &ModelIndex) -> bool {
        false
    }

    /// Columns are fixed; always `false`.
    pub fn remove_columns(&self, _position: usize, _count: usize, _parent: &ModelIndex) -> bool {
        false
    }

    fn parent_index(&self, storage: &ItemStorage, id: ItemId) -> ModelIndex {
        storage
            .parent_of(id)
            .map_or_else(ModelIndex::invalid, |parent| create_index(storage, parent, 0))
    }
}

fn rename_node<S: HierarchyStore + ?Sized>(
    store: &mut S,
    storage: &mut ItemStorage,
    id: ItemId,
    old: &HierarchyPath,
    key: &str,
) -> bool {
    let Some(name) = clean_node_name(key) else {
        tracing::debug!(target: targets::MODEL, key, "invalid node name");
        return false;
    };
    let (Some(parent), Some(parent_path)) = (storage.parent_of(id), old.parent()) else {
        return false;
    };
    let mut taken = storage.sibling_keys(parent, false, Some(id));
    taken.extend(
        store
            .children(&parent_path)
            .unwrap_or_default()
            .into_iter()
            .filter(|child| Some(child.as_str()) != old.name()),
    );
    let Ok(new) = parent_path.join(&unique_key(name, &taken)) else {
        return false;
    };
    if &new == old {
        return false;
    }
    if let Err(error) = store.rename(old, &new) {
        tracing::warn!(target: targets::MODEL, from = %old, to = %new, %error, "store rename failed");
        return false;
    }
    storage.rebase_paths(id, old, &new);
    tracing::debug!(target: targets::MODEL, from = %old, to = %new, "renamed row");
    true
}

fn rename_attr<S: HierarchyStore + ?Sized>(
    store: &mut S,
    storage: &mut ItemStorage,
    id: ItemId,
    key: &str,
) -> bool {
    let Some((owner, keys)) = attr_location(storage, id) else {
        return false;
    };
    let Some((AttrKey::Key(old), parents)) = keys.split_last() else {
        tracing::debug!(target: targets::MODEL, "list positions cannot be renamed");
        return false;
    };
    let name = key.trim();
    let Some(parent) = storage.parent_of(id) else {
        return false;
    };
    if name.is_empty() {
        return false;
    }
    let visible = storage.sibling_keys(parent, true, Some(id));

    let result = if parents.is_empty() {
        rename_top_level_attr(store, &owner, old, name, visible)
    } else {
        let mut renamed = None;
        modify_attr(store, &owner, parents, |container| match container {
            AttrValue::Map(map) => {
                let mut taken = visible;
                taken.extend(map.keys().filter(|k| *k != old).cloned());
                let new = unique_key(name, &taken);
                if &new == old {
                    return false;
                }
                match map.shift_remove(old.as_str()) {
                    Some(value) => {
                        map.insert(new.clone(), value);
                        renamed = Some(new);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        })
        .map(|_| renamed)
    };
    let new = match result {
        Ok(Some(new)) => new,
        Ok(None) => return false,
        Err(error) => {
            tracing::warn!(target: targets::MODEL, path = %owner, key = %old, %error, "attribute rename failed");
            return false;
        }
    };

    if let Some(item) = storage.get_mut(id) {
        item.kind = ItemKind::Attr(AttrKey::Key(new));
    }
    true
}

/// Move a top-level attribute to a key unique among the owner's stored
/// attributes. The new key is dropped again when removing the old one fails.
fn rename_top_level_attr<S: HierarchyStore + ?Sized>(
    store: &mut S,
    owner: &HierarchyPath,
    old: &str,
    name: &str,
    mut taken: Vec<String>,
) -> StoreResult<Option<String>> {
    let attrs = store.attrs(owner)?;
    taken.extend(attrs.keys().filter(|k| *k != old).cloned());
    let new = unique_key(name, &taken);
    if new == old {
        return Ok(None);
    }
    let value = attrs
        .get(old)
        .cloned()
        .ok_or_else(|| StoreError::attr_not_found(owner, old))?;
    store.set_attr(owner, &new, value)?;
    if let Err(error) = store.delete_attr(owner, old) {
        if let Err(rollback) = store.delete_attr(owner, &new) {
            tracing::error!(target: targets::MODEL, path = %owner, key = %new, error = %rollback, "rollback of attribute rename failed");
        }
        return Err(error);
    }
    Ok(Some(new))
}

/// Store `value` as a new child of the attribute container behind
/// `parent_id`. Returns the key of the new child, or `None` when the parent
/// cannot hold children.
fn insert_attr_value<S: HierarchyStore + ?Sized>(
    store: &mut S,
    storage: &ItemStorage,
    parent_id: ItemId,
    position: usize,
    key: &str,
    value: &AttrValue,
) -> StoreResult<Option<AttrKey>> {
    match storage.kind(parent_id) {
        Some(ItemKind::Group(path) | ItemKind::Array(path)) => {
            if key.is_empty() {
                return Ok(None);
            }
            let mut taken = storage.sibling_keys(parent_id, true, None);
            taken.extend(store.attrs(path)?.into_keys());
            let name = unique_key(key, &taken);
            store.set_attr(path, &name, value.clone())?;
            Ok(Some(AttrKey::Key(name)))
        }
        Some(ItemKind::Attr(_)) => {
            let Some((owner, keys)) = attr_location(storage, parent_id) else {
                return Ok(None);
            };
            let mut new_key = None;
            modify_attr(store, &owner, &keys, |container| match container {
                AttrValue::Map(map) if !key.is_empty() => {
                    let taken: Vec<&str> = map.keys().map(String::as_str).collect();
                    let name = unique_key(key, &taken);
                    map.insert(name.clone(), value.clone());
                    new_key = Some(AttrKey::Key(name));
                    true
                }
                AttrValue::List(items) if position <= items.len() => {
                    items.insert(position, value.clone());
                    new_key = Some(AttrKey::Index(position));
                    true
                }
                _ => false,
            })?;
            Ok(new_key)
        }
        None => Ok(None),
    }
}

/// Delete what `item` stands for. List elements are removed at
/// `list_position`, where earlier removals of the same batch have shifted
/// them.
fn delete_backing<S: HierarchyStore + ?Sized>(
    store: &mut S,
    storage: &ItemStorage,
    item: ItemId,
    list_position: usize,
) -> StoreResult<()> {
    match storage.kind(item) {
        Some(ItemKind::Group(path) | ItemKind::Array(path)) => store.delete(path),
        Some(ItemKind::Attr(_)) => {
            let (owner, keys) = attr_location(storage, item)
                .ok_or_else(|| StoreError::not_found("attribute owner"))?;
            let Some((last, parents)) = keys.split_last() else {
                return Err(StoreError::attr_not_found(&owner, ""));
            };
            if parents.is_empty() {
                let name = last
                    .as_key()
                    .ok_or_else(|| StoreError::attr_not_found(&owner, last))?;
                return store.delete_attr(&owner, name);
            }
            let deleted = modify_attr(store, &owner, parents, |container| match (container, last) {
                (AttrValue::Map(map), AttrKey::Key(key)) => map.shift_remove(key).is_some(),
                (AttrValue::List(items), AttrKey::Index(_)) if list_position < items.len() => {
                    items.remove(list_position);
                    true
                }
                _ => false,
            })?;
            if deleted {
                Ok(())
            } else {
                Err(StoreError::attr_not_found(&owner, last))
            }
        }
        None => Err(StoreError::not_found("removed row")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildOptions, ItemData, ItemModel};
    use crate::store::MemoryStore;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn path(s: &str) -> HierarchyPath {
        s.parse().unwrap()
    }

    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.require_leaf(&path("run.0/sweep.0/trace.0"), vec![100], "float64").unwrap();
        store.require_group(&path("run.0/sweep.1")).unwrap();
        store.require_group(&path("run.1")).unwrap();
        store
            .set_attr(&path("run.0"), "tags", AttrValue::from(vec!["a", "b", "c"]))
            .unwrap();
        store
            .set_attr(
                &path("run.0"),
                "meta",
                [("gain", AttrValue::from(2)), ("unit", AttrValue::from("V"))]
                    .into_iter()
                    .collect(),
            )
            .unwrap();
        store
    }

    fn model() -> HierarchyModel<MemoryStore> {
        HierarchyModel::new(sample(), BuildOptions::default().with_attrs(true)).unwrap()
    }

    fn root() -> ModelIndex {
        ModelIndex::invalid()
    }

    fn keys(model: &HierarchyModel<MemoryStore>, parent: &ModelIndex) -> Vec<String> {
        (0..model.row_count(parent))
            .map(|row| model.data(&model.index(row, 0, parent), ItemRole::Display).to_text())
            .collect()
    }

    #[test]
    fn test_rename_group_rewrites_subtree_paths() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        assert!(model.set_key(&run0, " run.7/ "));
        assert_eq!(model.item_path(&run0), Some(path("run.7")));
        let sweep = model.index(0, 0, &run0);
        let trace = model.index(0, 0, &sweep);
        assert_eq!(model.item_path(&trace), Some(path("run.7/sweep.0/trace.0")));
        assert!(model.with_store(|s| s.exists(&path("run.7/sweep.0/trace.0"))));
        assert_eq!(keys(&model, &root()), vec!["run.7", "run.1"]);
    }

    #[test]
    fn test_rename_rejections() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        assert!(!model.set_key(&run0, "a/b"));
        assert!(!model.set_key(&run0, "run.0"));
        assert!(!model.set_key(&run0, "  "));
        let tags = model.index(2, 0, &run0);
        let first = model.index(0, 0, &tags);
        assert!(!model.set_key(&first, "x"));
    }

    #[test]
    fn test_rename_to_sibling_name_uniquifies() {
        let model = model();
        let run1 = model.index(1, 0, &root());
        assert!(model.set_key(&run1, "run.0"));
        assert_eq!(model.item_path(&run1), Some(path("run.0_1")));
    }

    #[test]
    fn test_rename_attribute_keys() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let tags = model.index(2, 0, &run0);
        assert!(model.set_key(&tags, "labels"));
        let attrs = model.with_store(|s| s.attrs(&path("run.0")).unwrap());
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["meta", "labels"]);

        let meta = model.index(3, 0, &run0);
        let gain = model.index(0, 0, &meta);
        assert!(model.set_key(&gain, "unit"));
        assert_eq!(model.attr_chain(&gain).unwrap().1, vec![AttrKey::from("meta"), AttrKey::from("unit_1")]);
        let meta_value = model.with_store(|s| s.get_attr(&path("run.0"), "meta").unwrap());
        let map = meta_value.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["unit", "unit_1"]);
        assert_eq!(map["unit_1"], AttrValue::Int(2));
    }

    #[test]
    fn test_set_data_emits_data_then_info() {
        let model = model();
        let events = Arc::new(Mutex::new(Vec::new()));
        let data = events.clone();
        model
            .signals
            .data_changed
            .connect(move |(index, _, _)| data.lock().push(("data", index.column())));
        let info = events.clone();
        model
            .signals
            .info_changed
            .connect(move |index| info.lock().push(("info", index.column())));

        let run1 = model.index(1, 0, &root());
        assert!(model.set_data(&run1, ItemData::from("run.2"), ItemRole::Edit));
        assert_eq!(*events.lock(), vec![("data", 0), ("info", 0)]);
        assert!(!model.set_data(&run1, ItemData::from("run.3"), ItemRole::Display));
    }

    #[test]
    fn test_set_value() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let meta = model.index(3, 0, &run0);
        let unit = model.index(1, 1, &meta);
        assert!(model.set_data(&unit, ItemData::from("mV"), ItemRole::Edit));
        assert_eq!(model.data(&unit, ItemRole::Display), ItemData::from("mV"));
        assert_eq!(
            model.with_store(|s| s.get_attr(&path("run.0"), "meta").unwrap())
                .get(&AttrKey::from("unit"))
                .cloned(),
            Some(AttrValue::from("mV"))
        );

        let trace = model.index(0, 1, &model.index(0, 0, &run0));
        assert!(!model.set_data(&trace, ItemData::from("x"), ItemRole::Edit));
        assert!(!model.set_data(&meta.sibling_at_column(1), ItemData::from("x"), ItemRole::Edit));
    }

    #[test]
    fn test_set_value_agrees_with_flags() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let tags = model.index(2, 0, &run0);
        assert!(model.set_attr(&tags, AttrValue::List(Vec::new())));
        assert_eq!(model.row_count(&tags), 0);

        let value = tags.sibling_at_column(1);
        assert!(!model.flags(&value).editable);
        assert!(!model.set_data(&value, ItemData::Int(3), ItemRole::Edit));
        assert_eq!(
            model.with_store(|s| s.get_attr(&path("run.0"), "tags").unwrap()),
            AttrValue::List(Vec::new())
        );

        let meta = model.index(3, 0, &run0);
        let gain = model.index(0, 0, &meta);
        assert!(!model.set_value(&gain, AttrValue::List(vec![AttrValue::from(1)])));
        assert!(model.set_value(&gain, AttrValue::from(3)));
    }

    #[test]
    fn test_set_attr_rebuilds_children() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let tags = model.index(2, 0, &run0);
        assert!(model.set_attr(&tags, vec![1, 2]));
        assert_eq!(keys(&model, &tags), vec!["0", "1"]);
        assert!(model.set_attr(&tags, 5));
        assert_eq!(model.row_count(&tags), 0);
        assert_eq!(model.data(&tags.sibling_at_column(1), ItemRole::Display), ItemData::Int(5));
    }

    #[test]
    fn test_move_to() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let run1 = model.index(1, 0, &root());
        let sweep1 = model.index(1, 0, &run0);

        assert!(model.move_to(&sweep1, &run1, None));
        assert_eq!(keys(&model, &run1), vec!["sweep.1"]);
        assert!(model.with_store(|s| s.exists(&path("run.1/sweep.1"))));
        let moved = model.index(0, 0, &run1);
        assert_eq!(model.item_path(&moved), Some(path("run.1/sweep.1")));
    }

    #[test]
    fn test_move_rejections() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let run1 = model.index(1, 0, &root());
        let sweep0 = model.index(0, 0, &run0);
        let trace = model.index(0, 0, &sweep0);
        let tags = model.index(2, 0, &run0);

        assert!(!model.move_to(&sweep0, &run0, None));
        assert!(!model.move_to(&run0, &sweep0, None));
        assert!(!model.move_to(&sweep0, &trace, None));
        assert!(!model.move_to(&tags, &run1, None));

        assert!(model.insert_group(0, Some("sweep.0"), &run1));
        assert!(!model.move_to(&sweep0, &run1, None));
        assert_eq!(model.item_path(&sweep0), Some(path("run.0/sweep.0")));
    }

    #[test]
    fn test_move_row_signals() {
        let model = model();
        let events = Arc::new(Mutex::new(Vec::new()));
        let before = events.clone();
        model
            .signals
            .rows_about_to_be_moved
            .connect(move |(_, first, _, _, dest)| before.lock().push(("about", *first, *dest)));
        let after = events.clone();
        model
            .signals
            .rows_moved
            .connect(move |(_, first, _, _, dest)| after.lock().push(("moved", *first, *dest)));

        let run0 = model.index(0, 0, &root());
        assert!(!model.move_row(&run0, 1, &run0, -1));
        assert!(!model.move_row(&run0, 1, &root(), 9));
        assert!(model.move_row(&run0, 1, &root(), -1));
        assert_eq!(*events.lock(), vec![("about", 1, 2), ("moved", 1, 2)]);
        assert_eq!(keys(&model, &root()), vec!["run.0", "run.1", "sweep.1"]);
    }

    #[test]
    fn test_insert_nodes() {
        let model = model();
        let run1 = model.index(1, 0, &root());
        assert!(model.insert_group(0, None, &run1));
        assert!(model.insert_group(0, None, &run1));
        assert!(model.insert_array(2, Some("data"), vec![4], "int8", &run1));
        assert_eq!(keys(&model, &run1), vec!["new_group_1", "new_group", "data"]);
        assert!(model.with_store(|s| s.node(&path("run.1/data")).unwrap().is_leaf()));

        let data = model.index(2, 0, &run1);
        assert!(!model.insert_group(0, None, &data));
        assert!(!model.insert_group(9, None, &run1));
        assert!(!model.insert_group(0, Some("a/b"), &run1));
    }

    #[test]
    fn test_insert_attributes() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        assert!(model.insert_attribute(4, Some("tags"), 1, &run0));
        assert_eq!(keys(&model, &run0)[4], "tags_1");

        let meta = model.index(3, 0, &run0);
        assert!(model.insert_attribute(2, None, AttrValue::Null, &meta));
        assert_eq!(keys(&model, &meta), vec!["gain", "unit", "new_attr"]);

        let gain = model.index(0, 0, &meta);
        assert!(!model.insert_attribute(0, None, 1, &gain));
    }

    #[test]
    fn test_list_insert_and_remove_round_trip() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let tags = model.index(2, 0, &run0);
        let original = model.attr_value(&tags).unwrap();

        assert!(model.insert_attribute(1, None, "x", &tags));
        assert_eq!(keys(&model, &tags), vec!["0", "1", "2", "3"]);
        assert_eq!(
            model.attr_value(&tags),
            Some(AttrValue::from(vec!["a", "x", "b", "c"]))
        );
        assert_eq!(model.attr_value(&model.index(2, 0, &tags)), Some(AttrValue::from("b")));

        assert!(model.remove_rows(1, 1, &tags));
        assert_eq!(keys(&model, &tags), vec!["0", "1", "2"]);
        assert_eq!(model.attr_value(&tags), Some(original));
    }

    #[test]
    fn test_remove_rows() {
        let model = model();
        let run0 = model.index(0, 0, &root());
        let removed = Arc::new(Mutex::new(Vec::new()));
        let seen = removed.clone();
        model
            .signals
            .rows_removed
            .connect(move |(_, first, last)| seen.lock().push((*first, *last)));

        assert!(model.remove_rows(0, 2, &run0));
        assert!(!model.with_store(|s| s.exists(&path("run.0/sweep.0"))));
        assert_eq!(keys(&model, &run0), vec!["tags", "meta"]);

        let tags = model.index(0, 0, &run0);
        assert!(model.remove_rows(0, 2, &tags));
        assert_eq!(model.attr_value(&tags), Some(AttrValue::from(vec!["c"])));
        assert_eq!(keys(&model, &tags), vec!["0"]);

        assert!(model.remove_rows(1, 1, &run0));
        assert!(model.with_store(|s| s.get_attr(&path("run.0"), "meta").is_err()));
        assert_eq!(*removed.lock(), vec![(0, 1), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_remove_rejections() {
        let model = model();
        assert!(!model.remove_rows(0, 2, &root()));
        assert!(!model.remove_rows(1, 2, &root()));
        assert!(!model.remove_rows(0, 0, &root()));
        assert!(model.remove_rows(1, 1, &root()));
        assert!(!model.remove_rows(0, 1, &root()));
        assert!(!model.insert_columns(0, 1, &root()));
        assert!(!model.remove_columns(0, 1, &root()));
    }

    #[test]
    fn test_depth_changes_on_edits() {
        let model = model();
        let depths = Arc::new(Mutex::new(Vec::new()));
        let seen = depths.clone();
        model.signals.depth_changed.connect(move |depth| seen.lock().push(*depth));

        let run1 = model.index(1, 0, &root());
        assert!(model.insert_group(0, Some("a"), &run1));
        let a = model.index(0, 0, &run1);
        assert!(model.insert_group(0, Some("b"), &a));
        let b = model.index(0, 0, &a);
        assert!(model.insert_group(0, Some("c"), &b));
        assert_eq!(model.max_depth(), 4);
        assert!(model.remove_rows(0, 1, &run1));
        assert_eq!(*depths.lock(), vec![4, 3]);
    }
}
