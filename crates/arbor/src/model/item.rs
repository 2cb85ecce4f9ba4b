//! Arena storage for tree items.
//!
//! Items live in a `SlotMap`. Each item stores its parent's key and owns the
//! ordered list of its children's keys; removing an item removes its whole
//! subtree from the arena.

use slotmap::{Key, KeyData, SlotMap};

use crate::store::{AttrKey, HierarchyPath};

slotmap::new_key_type! {
    /// Handle of a tree item.
    pub struct ItemId;
}

impl ItemId {
    /// The id carried by [`ModelIndex`](super::ModelIndex); never zero for a
    /// live item.
    pub(crate) fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        KeyData::from_ffi(raw).into()
    }
}

/// What a tree item stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// A container; caches its store path.
    Group(HierarchyPath),
    /// A leaf array; caches its store path.
    Array(HierarchyPath),
    /// A map key or list position inside the attribute value owned by the
    /// nearest Group/Array ancestor.
    Attr(AttrKey),
}

impl ItemKind {
    /// The store path of Group/Array items.
    pub fn node_path(&self) -> Option<&HierarchyPath> {
        match self {
            ItemKind::Group(path) | ItemKind::Array(path) => Some(path),
            ItemKind::Attr(_) => None,
        }
    }

    /// `true` for Group and Array items.
    pub fn is_node(&self) -> bool {
        !self.is_attr()
    }

    /// `true` for Group items.
    pub fn is_group(&self) -> bool {
        matches!(self, ItemKind::Group(_))
    }

    /// `true` for Array items.
    pub fn is_array(&self) -> bool {
        matches!(self, ItemKind::Array(_))
    }

    /// `true` for attribute items.
    pub fn is_attr(&self) -> bool {
        matches!(self, ItemKind::Attr(_))
    }

    /// The text shown in the key column: the node name, map key or list
    /// position.
    pub fn key_text(&self) -> String {
        match self {
            ItemKind::Group(path) | ItemKind::Array(path) => {
                path.name().unwrap_or_default().to_string()
            }
            ItemKind::Attr(key) => key.to_string(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TreeItem {
    pub(crate) kind: ItemKind,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
}

impl TreeItem {
    fn new(kind: ItemKind, parent: Option<ItemId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
        }
    }
}

/// The item forest under one hidden root item.
#[derive(Debug)]
pub(crate) struct ItemStorage {
    items: SlotMap<ItemId, TreeItem>,
    root: ItemId,
}

impl ItemStorage {
    pub(crate) fn new(root: ItemKind) -> Self {
        let mut items = SlotMap::with_key();
        let root = items.insert(TreeItem::new(root, None));
        Self { items, root }
    }

    pub(crate) fn root(&self) -> ItemId {
        self.root
    }

    pub(crate) fn get(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut TreeItem> {
        self.items.get_mut(id)
    }

    pub(crate) fn kind(&self, id: ItemId) -> Option<&ItemKind> {
        self.items.get(id).map(|item| &item.kind)
    }

    pub(crate) fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(id).and_then(|item| item.parent)
    }

    pub(crate) fn children_of(&self, id: ItemId) -> &[ItemId] {
        self.items
            .get(id)
            .map(|item| item.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn child_at(&self, id: ItemId, row: usize) -> Option<ItemId> {
        self.children_of(id).get(row).copied()
    }

    pub(crate) fn child_count(&self, id: ItemId) -> usize {
        self.children_of(id).len()
    }

    pub(crate) fn row_of(&self, id: ItemId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&child| child == id)
    }

    /// Insert a new item under `parent`, at `position` or appended.
    pub(crate) fn add_child(
        &mut self,
        parent: ItemId,
        kind: ItemKind,
        position: Option<usize>,
    ) -> Option<ItemId> {
        if !self.items.contains_key(parent) {
            return None;
        }
        let id = self.items.insert(TreeItem::new(kind, Some(parent)));
        let siblings = &mut self.items[parent].children;
        let position = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(position, id);
        Some(id)
    }

    /// Unlink `id` from its parent, keeping its subtree in the arena.
    /// Returns the former parent and row.
    pub(crate) fn detach(&mut self, id: ItemId) -> Option<(ItemId, usize)> {
        let parent = self.parent_of(id)?;
        let row = self.row_of(id)?;
        self.items[parent].children.remove(row);
        self.items[id].parent = None;
        Some((parent, row))
    }

    /// Link a detached item under `parent` at `position` (clamped).
    pub(crate) fn reattach(&mut self, id: ItemId, parent: ItemId, position: usize) -> bool {
        if !self.items.contains_key(id) || !self.items.contains_key(parent) {
            return false;
        }
        let siblings = &mut self.items[parent].children;
        let position = position.min(siblings.len());
        siblings.insert(position, id);
        self.items[id].parent = Some(parent);
        true
    }

    /// Detach `id` and drop it with all its descendants.
    pub(crate) fn remove_subtree(&mut self, id: ItemId) {
        self.detach(id);
        for descendant in self.subtree(id) {
            self.items.remove(descendant);
        }
    }

    /// `id` and all its descendants, pre-order.
    pub(crate) fn subtree(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        if !self.items.contains_key(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_of(current).iter().rev().copied());
        }
        out
    }

    /// Number of ancestors; the root has depth 0.
    pub(crate) fn depth(&self, id: ItemId) -> usize {
        let mut depth = 0;
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent_of(parent);
        }
        depth
    }

    /// The greatest depth of any item.
    pub(crate) fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(self.children_of(id).iter().map(|&child| (child, depth + 1)));
        }
        max
    }

    /// `true` if `ancestor` is `id` or one of its ancestors.
    pub(crate) fn is_within(&self, id: ItemId, ancestor: ItemId) -> bool {
        let mut current = Some(id);
        while let Some(item) = current {
            if item == ancestor {
                return true;
            }
            current = self.parent_of(item);
        }
        false
    }

    /// For an attribute item, the Group/Array item owning the attribute
    /// table and the keys leading from that table to this item.
    pub(crate) fn attr_chain(&self, id: ItemId) -> Option<(ItemId, Vec<AttrKey>)> {
        let mut keys = Vec::new();
        let mut current = id;
        loop {
            let item = self.items.get(current)?;
            match &item.kind {
                ItemKind::Attr(key) => {
                    keys.push(key.clone());
                    current = item.parent?;
                }
                _ if keys.is_empty() => return None,
                _ => break,
            }
        }
        keys.reverse();
        Some((current, keys))
    }

    /// The store path of a Group/Array item.
    pub(crate) fn node_path(&self, id: ItemId) -> Option<&HierarchyPath> {
        self.kind(id).and_then(ItemKind::node_path)
    }

    /// Rewrite the cached paths of every Group/Array item in the subtree of
    /// `id` from under `from` to under `to`.
    pub(crate) fn rebase_paths(&mut self, id: ItemId, from: &HierarchyPath, to: &HierarchyPath) {
        for item in self.subtree(id) {
            if let Some(TreeItem {
                kind: ItemKind::Group(path) | ItemKind::Array(path),
                ..
            }) = self.items.get_mut(item)
                && let Some(rebased) = path.rebase(from, to)
            {
                *path = rebased;
            }
        }
    }

    /// Shift the list positions of the attribute children of `parent` at
    /// rows `from..` by `delta`.
    pub(crate) fn shift_indices(&mut self, parent: ItemId, from: usize, delta: isize) {
        let siblings: Vec<ItemId> = self.children_of(parent).iter().skip(from).copied().collect();
        for sibling in siblings {
            if let Some(TreeItem {
                kind: ItemKind::Attr(AttrKey::Index(index)),
                ..
            }) = self.items.get_mut(sibling)
            {
                *index = index.saturating_add_signed(delta);
            }
        }
    }

    /// Keys of the children of `parent` that are of the same family as
    /// `attr` (attribute keys, or node names), skipping `except`.
    pub(crate) fn sibling_keys(
        &self,
        parent: ItemId,
        attr: bool,
        except: Option<ItemId>,
    ) -> Vec<String> {
        self.children_of(parent)
            .iter()
            .filter(|&&child| Some(child) != except)
            .filter_map(|&child| self.kind(child))
            .filter(|kind| kind.is_attr() == attr)
            .map(ItemKind::key_text)
            .collect()
    }
}
