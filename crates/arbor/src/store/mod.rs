//! The backing hierarchy: paths, node metadata, attribute values and the
//! store interface the tree model edits through.
//!
//! A store holds named containers and leaf arrays. Every node carries an
//! ordered attribute table. [`MemoryStore`] is an in-memory implementation
//! that can be snapshotted to JSON.

mod memory;
mod value;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

pub use memory::MemoryStore;
pub use value::{AttrKey, AttrKind, AttrValue};

/// A path from the store root to a node.
///
/// The empty path is the root. Components are non-empty and never contain
/// `/`; the display form joins them with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HierarchyPath(Vec<String>);

impl HierarchyPath {
    /// The store root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from components.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPath`] if a component is empty or
    /// contains `/`.
    pub fn from_components<I, S>(components: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        for component in &components {
            validate_component(component).map_err(|message| {
                StoreError::invalid_path(components.join("/"), message)
            })?;
        }
        Ok(Self(components))
    }

    /// The components, outermost first.
    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last component; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The last component up to its first `.` (`channel` for `channel.3`).
    pub fn base_name(&self) -> Option<&str> {
        self.name()
            .map(|name| name.split_once('.').map_or(name, |(base, _)| base))
    }

    /// The containing path; `None` for the root.
    pub fn parent(&self) -> Option<HierarchyPath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Append one component.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPath`] for an empty name or one
    /// containing `/`.
    pub fn join(&self, name: &str) -> StoreResult<HierarchyPath> {
        validate_component(name)
            .map_err(|message| StoreError::invalid_path(format!("{self}/{name}"), message))?;
        let mut components = self.0.clone();
        components.push(name.to_string());
        Ok(Self(components))
    }

    /// `true` if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &HierarchyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Replace the leading `from` with `to`.
    ///
    /// Returns `None` if this path is not under `from`.
    pub fn rebase(&self, from: &HierarchyPath, to: &HierarchyPath) -> Option<HierarchyPath> {
        let rest = self.0.strip_prefix(from.0.as_slice())?;
        let mut components = to.0.clone();
        components.extend_from_slice(rest);
        Some(Self(components))
    }

    /// This path relative to `base`, if it lies under it.
    pub fn relative_to(&self, base: &HierarchyPath) -> Option<&[String]> {
        self.0.strip_prefix(base.0.as_slice())
    }
}

fn validate_component(component: &str) -> Result<(), &'static str> {
    if component.is_empty() {
        Err("empty path component")
    } else if component.contains('/') {
        Err("path component contains '/'")
    } else {
        Ok(())
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl FromStr for HierarchyPath {
    type Err = StoreError;

    /// Parse a `/`-separated path; leading and trailing `/` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_components(trimmed.split('/'))
    }
}

/// Whether a node holds children or data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A group of named children.
    Container,
    /// An n-dimensional array.
    Leaf,
}

/// Metadata for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Container or leaf.
    pub kind: NodeKind,
    /// Array shape; empty for containers.
    pub shape: Vec<u64>,
    /// Array element type; empty for containers.
    pub dtype: String,
}

impl NodeInfo {
    /// Metadata for a container.
    pub fn container() -> Self {
        Self {
            kind: NodeKind::Container,
            shape: Vec::new(),
            dtype: String::new(),
        }
    }

    /// Metadata for a leaf array.
    pub fn leaf(shape: Vec<u64>, dtype: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Leaf,
            shape,
            dtype: dtype.into(),
        }
    }

    /// `true` for containers.
    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// `true` for leaf arrays.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Shape and dtype summary for leaves, e.g. `(1000,) float64` or
    /// `(3, 4) int32`. `None` for containers.
    pub fn summary(&self) -> Option<String> {
        if !self.is_leaf() {
            return None;
        }
        let dims: Vec<String> = self.shape.iter().map(ToString::to_string).collect();
        let shape = match dims.len() {
            1 => format!("({},)", dims[0]),
            _ => format!("({})", dims.join(", ")),
        };
        Some(format!("{shape} {}", self.dtype))
    }
}

/// A hierarchical store of containers and leaf arrays with attributes.
///
/// Children are reported in stored order. `rename` moves a node (and its
/// subtree) to any path whose parent container exists, so it also serves as
/// the move primitive.
pub trait HierarchyStore {
    /// Metadata for the node at `path`.
    fn node(&self, path: &HierarchyPath) -> StoreResult<NodeInfo>;

    /// Names of the children of the container at `path`, in stored order.
    fn children(&self, path: &HierarchyPath) -> StoreResult<Vec<String>>;

    /// Create an empty container at `path`. The parent must exist.
    fn create_container(&mut self, path: &HierarchyPath) -> StoreResult<()>;

    /// Create a leaf array at `path`. The parent must exist.
    fn create_leaf(&mut self, path: &HierarchyPath, shape: Vec<u64>, dtype: &str)
    -> StoreResult<()>;

    /// Move the node at `from` to `to`.
    fn rename(&mut self, from: &HierarchyPath, to: &HierarchyPath) -> StoreResult<()>;

    /// Delete the node at `path` and everything under it.
    fn delete(&mut self, path: &HierarchyPath) -> StoreResult<()>;

    /// The ordered attribute table of the node at `path`.
    fn attrs(&self, path: &HierarchyPath) -> StoreResult<IndexMap<String, AttrValue>>;

    /// One top-level attribute.
    fn get_attr(&self, path: &HierarchyPath, key: &str) -> StoreResult<AttrValue>;

    /// Set a top-level attribute. New keys go to the end of the table.
    fn set_attr(&mut self, path: &HierarchyPath, key: &str, value: AttrValue) -> StoreResult<()>;

    /// Remove a top-level attribute.
    fn delete_attr(&mut self, path: &HierarchyPath, key: &str) -> StoreResult<()>;

    /// `true` if a node exists at `path`.
    fn exists(&self, path: &HierarchyPath) -> bool {
        self.node(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> HierarchyPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_path_parse_and_display() {
        assert!(path("/").is_root());
        assert_eq!(path("/run.0/sweep.1/").to_string(), "run.0/sweep.1");
        assert!(matches!(
            "a//b".parse::<HierarchyPath>(),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_path_navigation() {
        let p = path("run.0/sweep.1/channel.2");
        assert_eq!(p.name(), Some("channel.2"));
        assert_eq!(p.base_name(), Some("channel"));
        assert_eq!(p.parent(), Some(path("run.0/sweep.1")));
        assert_eq!(HierarchyPath::root().parent(), None);
        assert_eq!(p.len(), 3);
        assert!(p.starts_with(&path("run.0")));
        assert!(!p.starts_with(&path("run.1")));
        assert_eq!(path("a").join("b").unwrap(), path("a/b"));
        assert!(path("a").join("b/c").is_err());
        assert!(path("a").join("").is_err());
    }

    #[test]
    fn test_rebase() {
        let p = path("run.0/sweep.1/channel.2");
        assert_eq!(
            p.rebase(&path("run.0/sweep.1"), &path("run.1/sweep.9")),
            Some(path("run.1/sweep.9/channel.2"))
        );
        assert_eq!(p.rebase(&path("run.1"), &path("x")), None);
        assert_eq!(
            p.relative_to(&path("run.0")),
            Some(&["sweep.1".to_string(), "channel.2".to_string()][..])
        );
    }

    #[test]
    fn test_leaf_summary() {
        assert_eq!(
            NodeInfo::leaf(vec![1000], "float64").summary().as_deref(),
            Some("(1000,) float64")
        );
        assert_eq!(
            NodeInfo::leaf(vec![3, 4], "int32").summary().as_deref(),
            Some("(3, 4) int32")
        );
        assert_eq!(NodeInfo::leaf(vec![], "bool").summary().as_deref(), Some("() bool"));
        assert_eq!(NodeInfo::container().summary(), None);
    }
}
