//! Attribute values attached to hierarchy nodes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value stored in a node's attribute table.
///
/// Attributes are scalars, ordered lists or ordered string-keyed maps, and
/// lists and maps nest arbitrarily.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A null/empty value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value.
    Str(String),
    /// An ordered list of values.
    List(Vec<AttrValue>),
    /// An ordered key/value map.
    Map(IndexMap<String, AttrValue>),
}

/// Broad shape of an [`AttrValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// Null, bool, int, float or string.
    Scalar,
    /// A list.
    List,
    /// A map.
    Map,
}

/// One step into a nested attribute value: a map key or a list position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// Map key.
    Key(String),
    /// List position.
    Index(usize),
}

impl AttrKey {
    /// The map key, if this is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            AttrKey::Key(key) => Some(key),
            AttrKey::Index(_) => None,
        }
    }

    /// The list position, if this is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            AttrKey::Index(index) => Some(*index),
            AttrKey::Key(_) => None,
        }
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKey::Key(key) => f.write_str(key),
            AttrKey::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for AttrKey {
    fn from(key: &str) -> Self {
        AttrKey::Key(key.to_string())
    }
}

impl From<String> for AttrKey {
    fn from(key: String) -> Self {
        AttrKey::Key(key)
    }
}

impl From<usize> for AttrKey {
    fn from(index: usize) -> Self {
        AttrKey::Index(index)
    }
}

impl AttrValue {
    /// The broad shape of this value.
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::List(_) => AttrKind::List,
            AttrValue::Map(_) => AttrKind::Map,
            _ => AttrKind::Scalar,
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Returns true for scalars.
    pub fn is_scalar(&self) -> bool {
        self.kind() == AttrKind::Scalar
    }

    /// Returns this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a float, if it is one.
    /// Also converts integers to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns this value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&Vec<AttrValue>> {
        match self {
            AttrValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&IndexMap<String, AttrValue>> {
        match self {
            AttrValue::Map(v) => Some(v),
            _ => None,
        }
    }

    /// The keys of this value's children, in order: map keys or list
    /// positions. Scalars have none.
    pub fn child_keys(&self) -> Vec<AttrKey> {
        match self {
            AttrValue::List(items) => (0..items.len()).map(AttrKey::Index).collect(),
            AttrValue::Map(map) => map.keys().cloned().map(AttrKey::Key).collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a direct child.
    pub fn get(&self, key: &AttrKey) -> Option<&AttrValue> {
        match (self, key) {
            (AttrValue::Map(map), AttrKey::Key(k)) => map.get(k),
            (AttrValue::List(items), AttrKey::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Look up a direct child mutably.
    pub fn get_mut(&mut self, key: &AttrKey) -> Option<&mut AttrValue> {
        match (self, key) {
            (AttrValue::Map(map), AttrKey::Key(k)) => map.get_mut(k),
            (AttrValue::List(items), AttrKey::Index(i)) => items.get_mut(*i),
            _ => None,
        }
    }

    /// Follow a chain of keys.
    pub fn get_path(&self, keys: &[AttrKey]) -> Option<&AttrValue> {
        keys.iter().try_fold(self, |value, key| value.get(key))
    }

    /// Follow a chain of keys mutably.
    pub fn get_path_mut(&mut self, keys: &[AttrKey]) -> Option<&mut AttrValue> {
        keys.iter().try_fold(self, |value, key| value.get_mut(key))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v:?}"),
            AttrValue::Str(v) => f.write_str(v),
            AttrValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            AttrValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        AttrValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttrValue::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
