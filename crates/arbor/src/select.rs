//! Pre-order selection of nodes from a [`HierarchyStore`].
//!
//! The walk visits a container before its children and children in stored
//! order. The root of the walk is never a candidate itself.

use std::ops::ControlFlow;

use arbor_core::logging::targets;

use crate::error::PatternResult;
use crate::pattern::CompiledPattern;
use crate::store::{HierarchyPath, HierarchyStore, NodeInfo};

/// Which node kinds a selection reports.
///
/// Skipped kinds are still descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOptions {
    /// Report containers.
    pub include_groups: bool,
    /// Report leaf arrays.
    pub include_arrays: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            include_groups: true,
            include_arrays: true,
        }
    }
}

impl SelectOptions {
    fn includes(&self, info: &NodeInfo) -> bool {
        if info.is_container() {
            self.include_groups
        } else {
            self.include_arrays
        }
    }
}

/// A node reached by the walk.
struct Visit<'a> {
    path: &'a HierarchyPath,
    info: &'a NodeInfo,
    child_count: usize,
}

/// Selects nodes under a root of a store.
///
/// ```
/// use arbor::select::Selector;
/// use arbor::store::{HierarchyPath, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// for trace in ["trace.0", "trace.1"] {
///     let path = format!("run.0/sweep.0/channel.0/{trace}").parse().unwrap();
///     store.require_leaf(&path, vec![10], "float64").unwrap();
/// }
///
/// let selector = Selector::new(&store, HierarchyPath::root());
/// let traces = selector.find_leaves("run[0]/sweep[0]/channel[0]/trace[:]").unwrap();
/// assert_eq!(traces.len(), 2);
/// assert_eq!(selector.find_first("channel").unwrap().to_string(), "run.0/sweep.0/channel.0");
/// ```
pub struct Selector<'s, S: ?Sized> {
    store: &'s S,
    root: HierarchyPath,
    options: SelectOptions,
}

impl<'s, S: HierarchyStore + ?Sized> Selector<'s, S> {
    /// Select among the descendants of `root`.
    pub fn new(store: &'s S, root: HierarchyPath) -> Self {
        Self {
            store,
            root,
            options: SelectOptions::default(),
        }
    }

    /// Replace the kind toggles.
    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = options;
        self
    }

    /// The first node whose name, or name up to its first `.`, equals
    /// `name`.
    pub fn find_first(&self, name: &str) -> Option<HierarchyPath> {
        let mut found = None;
        self.walk(&mut |visit| {
            if names_match(visit.path, name) {
                found = Some(visit.path.clone());
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found
    }

    /// Every node whose name, or name up to its first `.`, equals `name`.
    pub fn find_all(&self, name: &str) -> Vec<HierarchyPath> {
        let mut found = Vec::new();
        self.walk(&mut |visit| {
            if names_match(visit.path, name) {
                found.push(visit.path.clone());
            }
            ControlFlow::Continue(())
        });
        found
    }

    /// Every node whose full store path matches `pattern`.
    ///
    /// When the pattern ends in `...` only true leaves are kept: leaf arrays
    /// and containers without children.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`](crate::error::PatternError) if `pattern`
    /// does not parse.
    pub fn find_leaves(&self, pattern: &str) -> PatternResult<Vec<HierarchyPath>> {
        let compiled = CompiledPattern::compile(pattern)?;
        Ok(self.find_matching(&compiled))
    }

    /// Like [`find_leaves`](Self::find_leaves) for a pre-compiled pattern.
    pub fn find_matching(&self, pattern: &CompiledPattern) -> Vec<HierarchyPath> {
        let leaves_only = pattern.ends_with_ellipsis();
        let mut found = Vec::new();
        self.walk(&mut |visit| {
            let is_true_leaf = visit.info.is_leaf() || visit.child_count == 0;
            if (!leaves_only || is_true_leaf)
                && pattern.matches_components(visit.path.components())
            {
                found.push(visit.path.clone());
            }
            ControlFlow::Continue(())
        });
        tracing::debug!(
            target: targets::SELECT,
            pattern = %pattern,
            root = %self.root,
            matches = found.len(),
            "selected nodes"
        );
        found
    }

    fn walk(&self, visitor: &mut dyn FnMut(Visit<'_>) -> ControlFlow<()>) {
        let _ = self.walk_children(&self.root, visitor);
    }

    fn walk_children(
        &self,
        parent: &HierarchyPath,
        visitor: &mut dyn FnMut(Visit<'_>) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let names = match self.store.children(parent) {
            Ok(names) => names,
            Err(error) => {
                tracing::trace!(target: targets::SELECT, path = %parent, %error, "not descending");
                return ControlFlow::Continue(());
            }
        };

        for name in names {
            let Ok(path) = parent.join(&name) else {
                continue;
            };
            let info = match self.store.node(&path) {
                Ok(info) => info,
                Err(error) => {
                    tracing::warn!(target: targets::SELECT, path = %path, %error, "skipping unreadable node");
                    continue;
                }
            };
            let child_count = if info.is_container() {
                self.store.children(&path).map_or(0, |c| c.len())
            } else {
                0
            };

            if self.options.includes(&info) {
                visitor(Visit {
                    path: &path,
                    info: &info,
                    child_count,
                })?;
            }
            if info.is_container() {
                self.walk_children(&path, visitor)?;
            }
        }
        ControlFlow::Continue(())
    }
}

fn names_match(path: &HierarchyPath, name: &str) -> bool {
    path.name() == Some(name) || path.base_name() == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn path(s: &str) -> HierarchyPath {
        s.parse().unwrap()
    }

    /// run.0/sweep.{0,1}/channel.{0,1}/trace.{0,1,2}/ydata, plus an empty
    /// group and a leaf directly under sweep.0.
    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        for sweep in 0..2 {
            for channel in 0..2 {
                for trace in 0..3 {
                    let leaf = format!(
                        "run.0/sweep.{sweep}/channel.{channel}/trace.{trace}/ydata"
                    );
                    store.require_leaf(&path(&leaf), vec![1000], "float64").unwrap();
                }
            }
        }
        store.require_group(&path("run.0/sweep.0/notes")).unwrap();
        store.require_leaf(&path("run.0/sweep.0/xdata"), vec![1000], "float64").unwrap();
        store
    }

    fn strings(paths: Vec<HierarchyPath>) -> Vec<String> {
        paths.into_iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_find_leaves_stops_at_pattern_depth() {
        let store = sample();
        let selector = Selector::new(&store, HierarchyPath::root());
        let found = selector
            .find_leaves("run[0]/sweep[0]/channel[0]/trace[:]")
            .unwrap();
        assert_eq!(
            strings(found),
            vec![
                "run.0/sweep.0/channel.0/trace.0",
                "run.0/sweep.0/channel.0/trace.1",
                "run.0/sweep.0/channel.0/trace.2",
            ]
        );
    }

    #[test]
    fn test_find_leaves_trailing_ellipsis_keeps_true_leaves() {
        let store = sample();
        let selector = Selector::new(&store, HierarchyPath::root());
        let found = selector.find_leaves("run[0]/sweep[0]/...").unwrap();
        let found = strings(found);
        assert_eq!(found.len(), 6 + 2);
        assert_eq!(found[0], "run.0/sweep.0/channel.0/trace.0/ydata");
        assert!(found.contains(&"run.0/sweep.0/notes".to_string()));
        assert!(found.contains(&"run.0/sweep.0/xdata".to_string()));
        assert!(!found.iter().any(|p| p.ends_with("trace.0")));
    }

    #[test]
    fn test_find_leaves_with_open_slice() {
        let store = sample();
        let selector = Selector::new(&store, HierarchyPath::root());
        let found = selector.find_leaves(".../channel[1:]/trace[2]").unwrap();
        assert_eq!(
            strings(found),
            vec![
                "run.0/sweep.0/channel.1/trace.2",
                "run.0/sweep.1/channel.1/trace.2",
            ]
        );
    }

    #[test]
    fn test_find_leaves_reports_parse_errors() {
        let store = sample();
        let selector = Selector::new(&store, HierarchyPath::root());
        assert!(selector.find_leaves("run[0").is_err());
    }

    #[test]
    fn test_find_first_and_all() {
        let store = sample();
        let selector = Selector::new(&store, HierarchyPath::root());
        assert_eq!(
            selector.find_first("trace").map(|p| p.to_string()).as_deref(),
            Some("run.0/sweep.0/channel.0/trace.0")
        );
        assert_eq!(
            selector.find_first("channel.1").map(|p| p.to_string()).as_deref(),
            Some("run.0/sweep.0/channel.1")
        );
        assert_eq!(selector.find_all("channel").len(), 4);
        assert_eq!(selector.find_all("ydata").len(), 12);
        assert!(selector.find_first("missing").is_none());
    }

    #[test]
    fn test_root_is_not_a_candidate() {
        let store = sample();
        let selector = Selector::new(&store, path("run.0/sweep.1"));
        assert!(selector.find_first("sweep").is_none());
        assert_eq!(selector.find_all("channel").len(), 2);
    }

    #[test]
    fn test_kind_toggles_do_not_prune() {
        let store = sample();
        let arrays_only = Selector::new(&store, HierarchyPath::root()).with_options(SelectOptions {
            include_groups: false,
            include_arrays: true,
        });
        assert!(arrays_only.find_first("trace").is_none());
        assert_eq!(arrays_only.find_all("ydata").len(), 12);

        let groups_only = Selector::new(&store, HierarchyPath::root()).with_options(SelectOptions {
            include_groups: true,
            include_arrays: false,
        });
        assert!(groups_only.find_all("ydata").is_empty());
        assert_eq!(groups_only.find_all("trace").len(), 12);
    }
}
