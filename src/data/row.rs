use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 / RFC 3339 text, compares lexicographically
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Numeric view used by the comparator when both sides are numbers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a cell value.
    /// Arrays and objects are kept as their compact JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else {
                    n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null)
                }
            }
            JsonValue::String(s) => CellValue::String(s.clone()),
            other => CellValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// An opaque record with a stable unique identifier.
///
/// The grid only relies on `id`; everything else is looked up by field name
/// through column accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub fields: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Display text for a field; missing and null values render as ""
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Build a row from a JSON object, taking the id from `id_field`
    pub fn from_json_object(value: &JsonValue, id_field: &str) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get(id_field)? {
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            _ => return None,
        };

        let fields = obj
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
            .collect();

        Some(Self { id, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_field_renders_empty() {
        let row = Row::new("1").with("title", "Alpha").with("note", CellValue::Null);
        assert_eq!(row.text("title"), "Alpha");
        assert_eq!(row.text("note"), "");
        assert_eq!(row.text("nonexistent"), "");
    }

    #[test]
    fn test_from_json_object() {
        let value = json!({"id": 7, "title": "Seven", "score": 1.5, "done": false, "tags": ["a"]});
        let row = Row::from_json_object(&value, "id").unwrap();
        assert_eq!(row.id, "7");
        assert_eq!(row.get("score"), Some(&CellValue::Float(1.5)));
        assert_eq!(row.get("done"), Some(&CellValue::Boolean(false)));
        assert_eq!(row.text("tags"), "[\"a\"]");
    }

    #[test]
    fn test_from_json_object_without_id() {
        let value = json!({"title": "orphan"});
        assert!(Row::from_json_object(&value, "id").is_none());
    }
}
