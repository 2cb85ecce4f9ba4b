//! Data roles and cell values for the hierarchy model.

use crate::store::AttrValue;

/// What aspect of a cell is being requested or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Text to show.
    Display,
    /// Value for an editor; same as `Display` for this model.
    Edit,
    /// Hover text: the full store path of group and array rows.
    ToolTip,
}

/// A cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data.
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render any variant as text. `None` renders as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            ItemData::None => String::new(),
            ItemData::String(s) => s.clone(),
            ItemData::Int(n) => n.to_string(),
            ItemData::Float(n) => format!("{n:?}"),
            ItemData::Bool(b) => b.to_string(),
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<Option<String>> for ItemData {
    fn from(opt: Option<String>) -> Self {
        opt.map_or(ItemData::None, ItemData::String)
    }
}

/// Scalars map to their typed variant, `Null` to `None`, and lists or maps
/// to their text rendering.
impl From<&AttrValue> for ItemData {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Null => ItemData::None,
            AttrValue::Bool(b) => ItemData::Bool(*b),
            AttrValue::Int(n) => ItemData::Int(*n),
            AttrValue::Float(n) => ItemData::Float(*n),
            AttrValue::Str(s) => ItemData::String(s.clone()),
            other => ItemData::String(other.to_string()),
        }
    }
}

impl From<ItemData> for AttrValue {
    fn from(data: ItemData) -> Self {
        match data {
            ItemData::None => AttrValue::Null,
            ItemData::String(s) => AttrValue::Str(s),
            ItemData::Int(n) => AttrValue::Int(n),
            ItemData::Float(n) => AttrValue::Float(n),
            ItemData::Bool(b) => AttrValue::Bool(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_data_accessors() {
        let data = ItemData::from("trace.0");
        assert_eq!(data.as_string(), Some("trace.0"));
        assert!(data.as_int().is_none());
        assert!(ItemData::None.is_none());
        assert_eq!(ItemData::from(Some("x".to_string())), ItemData::String("x".into()));
        assert_eq!(ItemData::from(None::<String>), ItemData::None);
    }

    #[test]
    fn test_attr_value_conversion() {
        assert_eq!(ItemData::from(&AttrValue::Int(3)), ItemData::Int(3));
        assert_eq!(ItemData::from(&AttrValue::Null), ItemData::None);
        assert_eq!(
            ItemData::from(&AttrValue::from(vec![1, 2])),
            ItemData::String("[1, 2]".into())
        );
        assert_eq!(AttrValue::from(ItemData::Float(0.5)), AttrValue::Float(0.5));
        assert_eq!(AttrValue::from(ItemData::None), AttrValue::Null);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(ItemData::Float(2.0).to_text(), "2.0");
        assert_eq!(ItemData::Bool(true).to_text(), "true");
        assert_eq!(ItemData::None.to_text(), "");
    }
}
