//! Building the item forest from a store.

use arbor_core::PerfSpan;
use arbor_core::logging::targets;

use crate::error::Result;
use crate::pattern::CompiledPattern;
use crate::select::{SelectOptions, Selector};
use crate::store::{AttrKey, AttrValue, HierarchyPath, HierarchyStore, NodeInfo};

use super::item::{ItemId, ItemKind, ItemStorage};

/// What part of the store a model mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// The store node shown as the (hidden) model root.
    pub root: HierarchyPath,
    /// When set, only nodes matching this pattern and their ancestors are
    /// shown.
    pub pattern: Option<String>,
    /// Attach attribute rows under every group, array and composite
    /// attribute.
    pub include_attrs: bool,
    /// Show leaf arrays.
    pub include_arrays: bool,
    /// Show containers.
    pub include_groups: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root: HierarchyPath::root(),
            pattern: None,
            include_attrs: false,
            include_arrays: true,
            include_groups: true,
        }
    }
}

impl BuildOptions {
    /// Mirror the subtree at `root`.
    pub fn with_root(mut self, root: HierarchyPath) -> Self {
        self.root = root;
        self
    }

    /// Only show nodes matching `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Toggle attribute rows.
    pub fn with_attrs(mut self, include: bool) -> Self {
        self.include_attrs = include;
        self
    }

    /// Toggle array rows.
    pub fn with_arrays(mut self, include: bool) -> Self {
        self.include_arrays = include;
        self
    }

    /// Toggle group rows.
    pub fn with_groups(mut self, include: bool) -> Self {
        self.include_groups = include;
        self
    }

    fn select_options(&self) -> SelectOptions {
        SelectOptions {
            include_groups: self.include_groups,
            include_arrays: self.include_arrays,
        }
    }
}

pub(crate) fn node_kind(path: HierarchyPath, info: &NodeInfo) -> ItemKind {
    if info.is_container() {
        ItemKind::Group(path)
    } else {
        ItemKind::Array(path)
    }
}

/// Build the item forest described by `options`.
///
/// Fails if the root does not exist or the pattern does not parse.
pub(crate) fn build_tree<S: HierarchyStore + ?Sized>(
    store: &S,
    options: &BuildOptions,
) -> Result<ItemStorage> {
    let _perf = PerfSpan::new("build_tree");

    let root_info = store.node(&options.root)?;
    let pattern = options
        .pattern
        .as_deref()
        .map(CompiledPattern::compile)
        .transpose()?;

    let mut storage = ItemStorage::new(node_kind(options.root.clone(), &root_info));
    let root = storage.root();

    match &pattern {
        Some(pattern) => add_selected(store, &mut storage, options, pattern),
        None if root_info.is_container() => add_all(store, &mut storage, root, options),
        None => {}
    }

    if options.include_attrs {
        let nodes = storage.subtree(root);
        for id in nodes {
            attach_node_attrs(store, &mut storage, id);
        }
    }

    tracing::debug!(
        target: targets::MODEL,
        root = %options.root,
        pattern = options.pattern.as_deref().unwrap_or(""),
        items = storage.subtree(root).len(),
        "built tree"
    );
    Ok(storage)
}

/// Mirror every child of the container behind `parent`, recursively, in
/// stored order.
fn add_all<S: HierarchyStore + ?Sized>(
    store: &S,
    storage: &mut ItemStorage,
    parent: ItemId,
    options: &BuildOptions,
) {
    let Some(parent_path) = storage.node_path(parent).cloned() else {
        return;
    };
    let names = match store.children(&parent_path) {
        Ok(names) => names,
        Err(error) => {
            tracing::warn!(target: targets::MODEL, path = %parent_path, %error, "cannot list children");
            return;
        }
    };

    for name in names {
        let Ok(path) = parent_path.join(&name) else {
            continue;
        };
        let info = match store.node(&path) {
            Ok(info) => info,
            Err(error) => {
                tracing::warn!(target: targets::MODEL, path = %path, %error, "skipping unreadable node");
                continue;
            }
        };
        let wanted = if info.is_container() {
            options.include_groups
        } else {
            options.include_arrays
        };
        if !wanted {
            continue;
        }
        let is_container = info.is_container();
        if let Some(child) = storage.add_child(parent, node_kind(path, &info), None)
            && is_container
        {
            add_all(store, storage, child, options);
        }
    }
}

/// Add every selected node with the chain of ancestors leading to it.
fn add_selected<S: HierarchyStore + ?Sized>(
    store: &S,
    storage: &mut ItemStorage,
    options: &BuildOptions,
    pattern: &CompiledPattern,
) {
    let selected = Selector::new(store, options.root.clone())
        .with_options(options.select_options())
        .find_matching(pattern);

    for path in selected {
        let Some(relative) = path.relative_to(&options.root) else {
            continue;
        };
        let mut item = storage.root();
        let mut current = options.root.clone();
        for name in relative {
            let Ok(next) = current.join(name) else {
                break;
            };
            let existing = storage
                .children_of(item)
                .iter()
                .copied()
                .find(|&child| storage.node_path(child) == Some(&next));
            item = match existing {
                Some(child) => child,
                None => {
                    let info = match store.node(&next) {
                        Ok(info) => info,
                        Err(error) => {
                            tracing::warn!(target: targets::MODEL, path = %next, %error, "skipping unreadable node");
                            break;
                        }
                    };
                    match storage.add_child(item, node_kind(next.clone(), &info), None) {
                        Some(child) => child,
                        None => break,
                    }
                }
            };
            current = next;
        }
    }
}

/// Attach the attribute table of a Group/Array item as attribute rows.
pub(crate) fn attach_node_attrs<S: HierarchyStore + ?Sized>(
    store: &S,
    storage: &mut ItemStorage,
    id: ItemId,
) {
    let Some(path) = storage.node_path(id).cloned() else {
        return;
    };
    let attrs = match store.attrs(&path) {
        Ok(attrs) => attrs,
        Err(error) => {
            tracing::warn!(target: targets::MODEL, path = %path, %error, "cannot read attributes");
            return;
        }
    };
    for (key, value) in &attrs {
        if let Some(child) = storage.add_child(id, ItemKind::Attr(AttrKey::Key(key.clone())), None) {
            attach_value(storage, child, value);
        }
    }
}

/// Attach one row per map key or list position of `value` under `parent`,
/// recursively.
pub(crate) fn attach_value(storage: &mut ItemStorage, parent: ItemId, value: &AttrValue) {
    for key in value.child_keys() {
        let Some(child_value) = value.get(&key) else {
            continue;
        };
        if let Some(child) = storage.add_child(parent, ItemKind::Attr(key), None) {
            attach_value(storage, child, child_value);
        }
    }
}
