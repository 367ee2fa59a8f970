//! Crawled records.
//!
//! A record is an opaque JSON object. Nothing inside it is interpreted by the
//! pipeline; it only has to be representable as a field name to value map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when an item cannot be turned into a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The item serialized to something other than a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The item could not be serialized at all.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// One unit of data produced by the upstream crawler, destined for indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Convert any serializable item into a record.
    ///
    /// Structs and maps are accepted; scalars, arrays and `null` are rejected.
    pub fn from_item<T: Serialize + ?Sized>(item: &T) -> Result<Self, RecordError> {
        let value =
            serde_json::to_value(item).map_err(|e| RecordError::Serialization(e.to_string()))?;
        Self::try_from(value)
    }

    /// Set a field, returning the record for chaining.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record and return the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(RecordError::NotAnObject("null")),
            Value::Bool(_) => Err(RecordError::NotAnObject("a boolean")),
            Value::Number(_) => Err(RecordError::NotAnObject("a number")),
            Value::String(_) => Err(RecordError::NotAnObject("a string")),
            Value::Array(_) => Err(RecordError::NotAnObject("an array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Product {
        id: u32,
        title: String,
        rating: Option<f32>,
    }

    #[test]
    fn test_from_struct() {
        let item = Product {
            id: 7,
            title: "Lamp".to_string(),
            rating: None,
        };

        let record = Record::from_item(&item).unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("id"), Some(&json!(7)));
        assert_eq!(record.get("title"), Some(&json!("Lamp")));
        assert_eq!(record.get("rating"), Some(&Value::Null));
    }

    #[test]
    fn test_from_map_value() {
        let record = Record::try_from(json!({"id": "a-1", "tags": ["x", "y"]})).unwrap();

        assert!(record.contains_key("tags"));
        assert_eq!(record.as_map()["id"], json!("a-1"));
    }

    #[test]
    fn test_rejects_non_objects() {
        assert_eq!(
            Record::from_item(&vec![1, 2, 3]),
            Err(RecordError::NotAnObject("an array"))
        );
        assert_eq!(
            Record::from_item("plain"),
            Err(RecordError::NotAnObject("a string"))
        );
        assert_eq!(
            Record::try_from(Value::Null),
            Err(RecordError::NotAnObject("null"))
        );
    }

    #[test]
    fn test_serializes_transparently() {
        let record = Record::new().with_field("id", 1).with_field("title", "A");

        let encoded = serde_json::to_value(&record).unwrap();

        assert_eq!(encoded, json!({"id": 1, "title": "A"}));
    }
}
