//! Text rendering of the model's rows.

use std::fmt::Write;

use arbor_core::TreeFormatOptions;

use crate::store::HierarchyStore;

use super::item::{ItemId, ItemKind, ItemStorage};
use super::tree::{HierarchyModel, attr_location, read_attr};

impl<S: HierarchyStore> HierarchyModel<S> {
    /// Render the rows as an indented tree, one row per line.
    ///
    /// Groups end in `/`, arrays show their shape and dtype, and leaf
    /// attributes their value when `show_values` is set.
    ///
    /// ```
    /// use arbor::model::{BuildOptions, HierarchyModel};
    /// use arbor::store::MemoryStore;
    /// use arbor_core::TreeFormatOptions;
    ///
    /// let mut store = MemoryStore::new();
    /// store.require_leaf(&"run.0/trace.0".parse().unwrap(), vec![10], "int16").unwrap();
    /// let model = HierarchyModel::new(store, BuildOptions::default()).unwrap();
    ///
    /// assert_eq!(
    ///     model.dump(&TreeFormatOptions::minimal()),
    ///     "`-- run.0/\n|  `-- trace.0\n"
    /// );
    /// ```
    pub fn dump(&self, options: &TreeFormatOptions) -> String {
        let store = self.store.read();
        let storage = self.storage.read();
        let mut out = String::new();
        self.dump_children(&store, &storage, storage.root(), 1, options, &mut out);
        out
    }

    fn dump_children(
        &self,
        store: &S,
        storage: &ItemStorage,
        parent: ItemId,
        depth: usize,
        options: &TreeFormatOptions,
        out: &mut String,
    ) {
        if options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let children = storage.children_of(parent);
        for (row, &child) in children.iter().enumerate() {
            let Some(kind) = storage.kind(child) else {
                continue;
            };
            let is_last = row + 1 == children.len();
            let _ = writeln!(
                out,
                "{}{}",
                options.prefix(depth, is_last),
                self.label(store, storage, child, kind, options.show_values)
            );
            self.dump_children(store, storage, child, depth + 1, options, out);
        }
    }

    fn label(
        &self,
        store: &S,
        storage: &ItemStorage,
        id: ItemId,
        kind: &ItemKind,
        show_values: bool,
    ) -> String {
        let key = kind.key_text();
        match kind {
            ItemKind::Group(_) => format!("{key}/"),
            ItemKind::Array(path) if show_values => match store.node(path).ok().and_then(|info| info.summary()) {
                Some(summary) => format!("{key} {summary}"),
                None => key,
            },
            ItemKind::Attr(_) if show_values && storage.child_count(id) == 0 => {
                match attr_location(storage, id).and_then(|(owner, keys)| read_attr(store, &owner, &keys).ok()) {
                    Some(value) => format!("{key}: {value}"),
                    None => key,
                }
            }
            _ => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{BuildOptions, HierarchyModel};
    use crate::store::{AttrValue, HierarchyPath, HierarchyStore, MemoryStore};
    use arbor_core::{TreeFormatOptions, TreeStyle};

    fn path(s: &str) -> HierarchyPath {
        s.parse().unwrap()
    }

    fn model() -> HierarchyModel<MemoryStore> {
        let mut store = MemoryStore::new();
        store.require_leaf(&path("run.0/sweep.0/ydata"), vec![1000], "float64").unwrap();
        store.require_leaf(&path("run.0/xdata"), vec![3, 4], "int32").unwrap();
        store.set_attr(&path("run.0"), "gain", AttrValue::from(2)).unwrap();
        HierarchyModel::new(store, BuildOptions::default().with_attrs(true)).unwrap()
    }

    #[test]
    fn test_dump_ascii_with_values() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        let expected = "\
`-- run.0/
|  +-- sweep.0/
|  |  `-- ydata (1000,) float64
|  +-- xdata (3, 4) int32
|  `-- gain: 2
";
        assert_eq!(model().dump(&options), expected);
    }

    #[test]
    fn test_dump_compact_limited_depth() {
        let options = TreeFormatOptions {
            style: TreeStyle::Compact,
            show_values: false,
            max_depth: Some(2),
            indent_size: 1,
        };
        assert_eq!(model().dump(&options), "- run.0/\n - sweep.0/\n - xdata\n - gain\n");
    }
}
