//! Document representation and system-field handling

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client-supplied or generated document key.
pub const KEY_FIELD: &str = "_key";
/// Fully qualified handle, `collection/key`.
pub const ID_FIELD: &str = "_id";
/// Store-assigned revision token.
pub const REV_FIELD: &str = "_rev";
/// Source vertex handle of an edge document.
pub const FROM_FIELD: &str = "_from";
/// Target vertex handle of an edge document.
pub const TO_FIELD: &str = "_to";

/// An opaque key-value record owned by the document store.
///
/// Payload fields are arbitrary JSON; the store maintains the `_key`,
/// `_id` and `_rev` system fields on every write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Interpret a JSON value as a document. Only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Document(map)),
            _ => None,
        }
    }

    /// Document key, if assigned.
    pub fn key(&self) -> Option<&str> {
        self.get_str(KEY_FIELD)
    }

    /// Revision token, if stamped.
    pub fn rev(&self) -> Option<&str> {
        self.get_str(REV_FIELD)
    }

    /// Full handle (`collection/key`), if assigned.
    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    /// Source vertex handle (edge documents).
    pub fn from_handle(&self) -> Option<&str> {
        self.get_str(FROM_FIELD)
    }

    /// Target vertex handle (edge documents).
    pub fn to_handle(&self) -> Option<&str> {
        self.get_str(TO_FIELD)
    }

    /// A string field, if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// A raw field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Remove a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Drop the store-maintained system fields, keeping `_from`/`_to`.
    pub fn strip_system_fields(&mut self) {
        self.0.remove(KEY_FIELD);
        self.0.remove(ID_FIELD);
        self.0.remove(REV_FIELD);
    }

    /// Iterate over all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Render as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

/// Identity of a stored document revision, returned by every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Full handle, `collection/key`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Key within the collection.
    #[serde(rename = "_key")]
    pub key: String,
    /// Revision token assigned by the store.
    #[serde(rename = "_rev")]
    pub rev: String,
}

impl DocumentMeta {
    pub fn new(collection: &str, key: &str, rev: impl Into<String>) -> Self {
        DocumentMeta {
            id: document_handle(collection, key),
            key: key.to_string(),
            rev: rev.into(),
        }
    }
}

/// Build a `collection/key` handle.
pub fn document_handle(collection: &str, key: &str) -> String {
    format!("{}/{}", collection, key)
}

/// Split a `collection/key` handle into its parts.
///
/// Handles must contain exactly one separator with non-empty parts.
pub fn split_handle(handle: &str) -> Option<(&str, &str)> {
    let (collection, key) = handle.split_once('/')?;
    if collection.is_empty() || key.is_empty() || key.contains('/') {
        return None;
    }
    Some((collection, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_fields() {
        let mut doc = Document::from_value(json!({
            "_key": "alice",
            "_id": "person/alice",
            "_rev": "7",
            "name": "Alice",
        }))
        .unwrap();

        assert_eq!(doc.key(), Some("alice"));
        assert_eq!(doc.id(), Some("person/alice"));
        assert_eq!(doc.rev(), Some("7"));

        doc.strip_system_fields();
        assert_eq!(doc.key(), None);
        assert_eq!(doc.get_str("name"), Some("Alice"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Document::from_value(json!("scalar")).is_none());
        assert!(Document::from_value(json!([1, 2, 3])).is_none());
        assert!(Document::from_value(json!({"a": 1})).is_some());
    }

    #[test]
    fn test_split_handle() {
        assert_eq!(split_handle("person/alice"), Some(("person", "alice")));
        assert_eq!(split_handle("person"), None);
        assert_eq!(split_handle("/alice"), None);
        assert_eq!(split_handle("person/"), None);
        assert_eq!(split_handle("a/b/c"), None);
    }

    #[test]
    fn test_meta_handle() {
        let meta = DocumentMeta::new("person", "alice", "42");
        assert_eq!(meta.id, "person/alice");
        assert_eq!(meta.key, "alice");
        assert_eq!(meta.rev, "42");
    }
}
