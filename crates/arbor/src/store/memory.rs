//! In-memory [`HierarchyStore`] with JSON snapshots.

use std::fs;
use std::io::Write;
use std::path::Path;

use arbor_core::logging::targets;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{AttrValue, HierarchyPath, HierarchyStore, NodeInfo};
use crate::error::{StoreError, StoreResult};

/// A stored node. Children are kept in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Node {
    Container {
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attrs: IndexMap<String, AttrValue>,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        children: IndexMap<String, Node>,
    },
    Leaf {
        shape: Vec<u64>,
        dtype: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attrs: IndexMap<String, AttrValue>,
    },
}

impl Node {
    fn container() -> Self {
        Node::Container {
            attrs: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    fn info(&self) -> NodeInfo {
        match self {
            Node::Container { .. } => NodeInfo::container(),
            Node::Leaf { shape, dtype, .. } => NodeInfo::leaf(shape.clone(), dtype.clone()),
        }
    }

    fn attrs(&self) -> &IndexMap<String, AttrValue> {
        match self {
            Node::Container { attrs, .. } | Node::Leaf { attrs, .. } => attrs,
        }
    }

    fn attrs_mut(&mut self) -> &mut IndexMap<String, AttrValue> {
        match self {
            Node::Container { attrs, .. } | Node::Leaf { attrs, .. } => attrs,
        }
    }

    fn children(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Container { children, .. } => Some(children),
            Node::Leaf { .. } => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Container { children, .. } => Some(children),
            Node::Leaf { .. } => None,
        }
    }
}

/// A hierarchy held entirely in memory.
///
/// Renames inside one container keep the node's position; moves to another
/// container append it. The whole hierarchy serializes to JSON:
///
/// ```
/// use arbor::store::{HierarchyStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// store.require_leaf(&"run.0/sweep.0/trace.0".parse().unwrap(), vec![1000], "float64").unwrap();
///
/// let json = store.to_json_string().unwrap();
/// let copy = MemoryStore::from_json_str(&json).unwrap();
/// assert_eq!(copy, store);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    root: Node,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store whose root is an empty container.
    pub fn new() -> Self {
        Self {
            root: Node::container(),
        }
    }

    /// Create a container at `path` along with any missing ancestors.
    ///
    /// Succeeds without change if a container already exists there.
    pub fn require_group(&mut self, path: &HierarchyPath) -> StoreResult<()> {
        let mut node = &mut self.root;
        for (depth, name) in path.components().iter().enumerate() {
            let children = node.children_mut().ok_or_else(|| {
                StoreError::not_a_container(path.components()[..depth].join("/"))
            })?;
            node = children.entry(name.clone()).or_insert_with(Node::container);
        }
        match node {
            Node::Container { .. } => Ok(()),
            Node::Leaf { .. } => Err(StoreError::not_a_container(path)),
        }
    }

    /// Create a leaf at `path`, creating missing ancestor containers.
    pub fn require_leaf(
        &mut self,
        path: &HierarchyPath,
        shape: Vec<u64>,
        dtype: &str,
    ) -> StoreResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::invalid_path(path, "the root cannot be a leaf"))?;
        self.require_group(&parent)?;
        self.create_leaf(path, shape, dtype)
    }

    /// Serialize the whole hierarchy to a JSON string.
    pub fn to_json_string(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild a hierarchy from [`to_json_string`](Self::to_json_string)
    /// output.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write a JSON snapshot to `path`.
    ///
    /// The snapshot goes to a temporary file in the same directory first and
    /// is renamed over `path`, so an existing snapshot is either replaced
    /// whole or left untouched.
    pub fn save_json(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let bytes = serde_json::to_vec_pretty(self)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(path, e))?;
        temp.write_all(&bytes).map_err(|e| StoreError::io(path, e))?;
        temp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

        tracing::debug!(target: targets::STORE, path = %path.display(), "saved store snapshot");
        Ok(())
    }

    /// Load a JSON snapshot written by [`save_json`](Self::save_json).
    pub fn load_json(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let store = Self::from_json_str(&content)?;
        tracing::debug!(target: targets::STORE, path = %path.display(), "loaded store snapshot");
        Ok(store)
    }

    fn lookup(&self, path: &HierarchyPath) -> StoreResult<&Node> {
        let mut node = &self.root;
        for name in path.components() {
            node = node
                .children()
                .and_then(|children| children.get(name))
                .ok_or_else(|| StoreError::not_found(path))?;
        }
        Ok(node)
    }

    fn lookup_mut(&mut self, path: &HierarchyPath) -> StoreResult<&mut Node> {
        let mut node = &mut self.root;
        for name in path.components() {
            node = node
                .children_mut()
                .and_then(|children| children.get_mut(name))
                .ok_or_else(|| StoreError::not_found(path))?;
        }
        Ok(node)
    }

    /// The child table of the container that would hold `path`, plus the
    /// child's name.
    fn parent_table_mut<'a>(
        &mut self,
        path: &'a HierarchyPath,
    ) -> StoreResult<(&mut IndexMap<String, Node>, &'a str)> {
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return Err(StoreError::invalid_path(path, "operation not valid on the root"));
        };
        let children = self
            .lookup_mut(&parent)?
            .children_mut()
            .ok_or_else(|| StoreError::not_a_container(&parent))?;
        Ok((children, name))
    }

    fn insert_new(&mut self, path: &HierarchyPath, node: Node) -> StoreResult<()> {
        let (children, name) = self.parent_table_mut(path)?;
        if children.contains_key(name) {
            return Err(StoreError::already_exists(path));
        }
        children.insert(name.to_string(), node);
        Ok(())
    }
}

impl HierarchyStore for MemoryStore {
    fn node(&self, path: &HierarchyPath) -> StoreResult<NodeInfo> {
        self.lookup(path).map(Node::info)
    }

    fn children(&self, path: &HierarchyPath) -> StoreResult<Vec<String>> {
        self.lookup(path)?
            .children()
            .map(|children| children.keys().cloned().collect())
            .ok_or_else(|| StoreError::not_a_container(path))
    }

    fn create_container(&mut self, path: &HierarchyPath) -> StoreResult<()> {
        self.insert_new(path, Node::container())?;
        tracing::debug!(target: targets::STORE, path = %path, "created container");
        Ok(())
    }

    fn create_leaf(
        &mut self,
        path: &HierarchyPath,
        shape: Vec<u64>,
        dtype: &str,
    ) -> StoreResult<()> {
        self.insert_new(
            path,
            Node::Leaf {
                shape,
                dtype: dtype.to_string(),
                attrs: IndexMap::new(),
            },
        )?;
        tracing::debug!(target: targets::STORE, path = %path, "created leaf");
        Ok(())
    }

    fn rename(&mut self, from: &HierarchyPath, to: &HierarchyPath) -> StoreResult<()> {
        if from == to {
            return Ok(());
        }
        if from.is_root() || to.is_root() {
            return Err(StoreError::invalid_path(from, "cannot rename the root"));
        }
        if to.starts_with(from) {
            return Err(StoreError::invalid_path(
                to,
                format!("cannot move '{from}' into itself"),
            ));
        }
        self.lookup(from)?;
        if self.lookup(to).is_ok() {
            return Err(StoreError::already_exists(to));
        }
        // The destination must be valid before the source is detached.
        self.parent_table_mut(to)?;

        let same_parent = from.parent() == to.parent();
        let (source, from_name) = self.parent_table_mut(from)?;
        let position = source.get_index_of(from_name);
        let Some(node) = source.shift_remove(from_name) else {
            return Err(StoreError::not_found(from));
        };

        let (target, to_name) = self.parent_table_mut(to)?;
        match position {
            Some(index) if same_parent => {
                target.shift_insert(index, to_name.to_string(), node);
            }
            _ => {
                target.insert(to_name.to_string(), node);
            }
        }

        tracing::debug!(target: targets::STORE, from = %from, to = %to, "renamed node");
        Ok(())
    }

    fn delete(&mut self, path: &HierarchyPath) -> StoreResult<()> {
        let (children, name) = self.parent_table_mut(path)?;
        children
            .shift_remove(name)
            .ok_or_else(|| StoreError::not_found(path))?;
        tracing::debug!(target: targets::STORE, path = %path, "deleted node");
        Ok(())
    }

    fn attrs(&self, path: &HierarchyPath) -> StoreResult<IndexMap<String, AttrValue>> {
        Ok(self.lookup(path)?.attrs().clone())
    }

    fn get_attr(&self, path: &HierarchyPath, key: &str) -> StoreResult<AttrValue> {
        self.lookup(path)?
            .attrs()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::attr_not_found(path, key))
    }

    fn set_attr(&mut self, path: &HierarchyPath, key: &str, value: AttrValue) -> StoreResult<()> {
        self.lookup_mut(path)?
            .attrs_mut()
            .insert(key.to_string(), value);
        tracing::trace!(target: targets::STORE, path = %path, key, "set attribute");
        Ok(())
    }

    fn delete_attr(&mut self, path: &HierarchyPath, key: &str) -> StoreResult<()> {
        self.lookup_mut(path)?
            .attrs_mut()
            .shift_remove(key)
            .ok_or_else(|| StoreError::attr_not_found(path, key))?;
        tracing::trace!(target: targets::STORE, path = %path, key, "deleted attribute");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> HierarchyPath {
        s.parse().unwrap()
    }

    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.require_leaf(&path("run.0/sweep.0/trace.0"), vec![100], "float64").unwrap();
        store.require_leaf(&path("run.0/sweep.0/trace.1"), vec![100], "float64").unwrap();
        store.require_group(&path("run.0/sweep.1")).unwrap();
        store.require_group(&path("run.1")).unwrap();
        store
    }

    #[test]
    fn test_create_and_children() {
        let store = sample();
        assert_eq!(store.children(&HierarchyPath::root()).unwrap(), vec!["run.0", "run.1"]);
        assert_eq!(
            store.children(&path("run.0/sweep.0")).unwrap(),
            vec!["trace.0", "trace.1"]
        );
        assert!(store.node(&path("run.0/sweep.0/trace.1")).unwrap().is_leaf());
        assert!(matches!(
            store.children(&path("run.0/sweep.0/trace.1")),
            Err(StoreError::NotAContainer { .. })
        ));
        assert!(matches!(
            store.node(&path("run.0/sweep.0/trace.1/x")),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_rejections() {
        let mut store = sample();
        assert!(matches!(
            store.create_container(&path("run.0")),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.create_container(&path("missing/x")),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.create_container(&path("run.0/sweep.0/trace.0/x")),
            Err(StoreError::NotAContainer { .. })
        ));
        assert!(matches!(
            store.create_container(&HierarchyPath::root()),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_rename_in_place_keeps_position() {
        let mut store = sample();
        store.rename(&path("run.0"), &path("run.5")).unwrap();
        assert_eq!(store.children(&HierarchyPath::root()).unwrap(), vec!["run.5", "run.1"]);
        assert!(store.exists(&path("run.5/sweep.0/trace.1")));
        assert!(!store.exists(&path("run.0")));
    }

    #[test]
    fn test_move_appends() {
        let mut store = sample();
        store
            .rename(&path("run.0/sweep.1"), &path("run.1/sweep.1"))
            .unwrap();
        assert_eq!(store.children(&path("run.0")).unwrap(), vec!["sweep.0"]);
        assert_eq!(store.children(&path("run.1")).unwrap(), vec!["sweep.1"]);
    }

    #[test]
    fn test_rename_rejections() {
        let mut store = sample();
        assert!(matches!(
            store.rename(&path("run.0"), &path("run.1")),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.rename(&path("run.0"), &path("run.0/sweep.0/inner")),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.rename(&path("nope"), &path("other")),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.rename(&path("run.1"), &path("missing/run.1")),
            Err(StoreError::NotFound { .. })
        ));
        // Nothing was detached by the failed attempts.
        assert_eq!(store, sample());
    }

    #[test]
    fn test_delete() {
        let mut store = sample();
        store.delete(&path("run.0/sweep.0")).unwrap();
        assert_eq!(store.children(&path("run.0")).unwrap(), vec!["sweep.1"]);
        assert!(store.delete(&path("run.0/sweep.0")).is_err());
        assert!(store.delete(&HierarchyPath::root()).is_err());
    }

    #[test]
    fn test_attributes() {
        let mut store = sample();
        let run = path("run.0");
        store.set_attr(&run, "units", "mV".into()).unwrap();
        store.set_attr(&run, "gain", 2.into()).unwrap();
        store.set_attr(&run, "units", "V".into()).unwrap();

        let attrs = store.attrs(&run).unwrap();
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["units", "gain"]);
        assert_eq!(store.get_attr(&run, "units").unwrap(), AttrValue::from("V"));

        store.delete_attr(&run, "units").unwrap();
        assert!(matches!(
            store.get_attr(&run, "units"),
            Err(StoreError::AttrNotFound { .. })
        ));
        assert!(store.delete_attr(&run, "units").is_err());
    }

    #[test]
    fn test_json_snapshot() {
        let mut store = sample();
        store
            .set_attr(&path("run.0/sweep.0/trace.0"), "probe", vec![1, 2].into())
            .unwrap();

        let json = store.to_json_string().unwrap();
        assert_eq!(MemoryStore::from_json_str(&json).unwrap(), store);
        assert!(matches!(
            MemoryStore::from_json_str("{"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        let store = sample();

        store.save_json(&file).unwrap();
        assert_eq!(MemoryStore::load_json(&file).unwrap(), store);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            MemoryStore::load_json(&missing),
            Err(StoreError::Io { .. })
        ));
    }
}
