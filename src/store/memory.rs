//! In-memory document store engine
//!
//! Collections are insertion-ordered maps guarded by a single lock; a
//! monotonic counter produces opaque revision tokens. Keys not supplied by
//! the client are generated from a per-collection sequence.

use super::document::{document_handle, Document, DocumentMeta, ID_FIELD, KEY_FIELD, REV_FIELD};
use super::{CollectionKind, DocumentStore, StoreError, StoreResult, WriteOptions};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct Collection {
    kind: CollectionKind,
    documents: IndexMap<String, Document>,
    next_key: u64,
}

impl Collection {
    fn new(kind: CollectionKind) -> Self {
        Collection {
            kind,
            documents: IndexMap::new(),
            next_key: 1,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    collections: IndexMap<String, Collection>,
    tick: u64,
}

impl StoreState {
    fn collection_mut(&mut self, name: &str) -> StoreResult<&mut Collection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn collection(&self, name: &str) -> StoreResult<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn next_rev(&mut self) -> String {
        self.tick += 1;
        self.tick.to_string()
    }
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.contains('/') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn stamp(document: &mut Document, collection: &str, key: &str, rev: &str) {
    document.insert(KEY_FIELD, Value::from(key));
    document.insert(ID_FIELD, Value::from(document_handle(collection, key)));
    document.insert(REV_FIELD, Value::from(rev));
}

impl DocumentStore for MemoryStore {
    fn create_collection(&self, name: &str, kind: CollectionKind) -> StoreResult<()> {
        let mut state = self.write();
        match state.collections.get(name) {
            Some(existing) if existing.kind == kind => Ok(()),
            Some(_) => Err(StoreError::CollectionKindMismatch(name.to_string())),
            None => {
                state
                    .collections
                    .insert(name.to_string(), Collection::new(kind));
                Ok(())
            }
        }
    }

    fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let mut state = self.write();
        state
            .collections
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn has_collection(&self, name: &str) -> bool {
        self.read().collections.contains_key(name)
    }

    fn insert(
        &self,
        collection: &str,
        mut document: Document,
        _options: &WriteOptions,
    ) -> StoreResult<DocumentMeta> {
        let mut state = self.write();
        let rev = state.next_rev();
        let target = state.collection_mut(collection)?;

        let key = match document.key() {
            Some(key) => {
                validate_key(key)?;
                key.to_string()
            }
            None => {
                let key = target.next_key.to_string();
                target.next_key += 1;
                key
            }
        };
        if target.documents.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                key,
            });
        }

        stamp(&mut document, collection, &key, &rev);
        target.documents.insert(key.clone(), document);
        Ok(DocumentMeta::new(collection, &key, rev))
    }

    fn fetch(&self, collection: &str, key: &str) -> StoreResult<Document> {
        let state = self.read();
        let target = state.collection(collection)?;
        target
            .documents
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })
    }

    fn replace(
        &self,
        collection: &str,
        key: &str,
        mut document: Document,
        _options: &WriteOptions,
    ) -> StoreResult<DocumentMeta> {
        let mut state = self.write();
        let rev = state.next_rev();
        let target = state.collection_mut(collection)?;
        let slot = target
            .documents
            .get_mut(key)
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;

        document.strip_system_fields();
        stamp(&mut document, collection, key, &rev);
        *slot = document;
        Ok(DocumentMeta::new(collection, key, rev))
    }

    fn update(
        &self,
        collection: &str,
        key: &str,
        patch: Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentMeta> {
        let mut state = self.write();
        let rev = state.next_rev();
        let target = state.collection_mut(collection)?;
        let slot = target
            .documents
            .get_mut(key)
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;

        let mut patch = patch;
        patch.strip_system_fields();
        for (field, value) in patch.into_fields() {
            if value.is_null() && !options.keep_null {
                slot.remove(&field);
            } else {
                slot.insert(field, value);
            }
        }
        stamp(slot, collection, key, &rev);
        Ok(DocumentMeta::new(collection, key, rev))
    }

    fn remove(
        &self,
        collection: &str,
        key: &str,
        _options: &WriteOptions,
    ) -> StoreResult<DocumentMeta> {
        let mut state = self.write();
        let target = state.collection_mut(collection)?;
        let removed =
            target
                .documents
                .shift_remove(key)
                .ok_or_else(|| StoreError::DocumentNotFound {
                    collection: collection.to_string(),
                    key: key.to_string(),
                })?;
        let rev = removed.rev().unwrap_or_default().to_string();
        Ok(DocumentMeta::new(collection, key, rev))
    }

    fn scan(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.read();
        let target = state.collection(collection)?;
        Ok(target.documents.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_collection_lifecycle() {
        let store = MemoryStore::new();
        assert!(!store.has_collection("person"));

        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        assert!(store.has_collection("person"));

        // same kind is a no-op, different kind is refused
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        assert_eq!(
            store.create_collection("person", CollectionKind::Edge),
            Err(StoreError::CollectionKindMismatch("person".to_string()))
        );

        store.drop_collection("person").unwrap();
        assert_eq!(
            store.drop_collection("person"),
            Err(StoreError::CollectionNotFound("person".to_string()))
        );
    }

    #[test]
    fn test_insert_stamps_system_fields() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();

        let meta = store
            .insert(
                "person",
                doc(json!({"_key": "alice", "name": "Alice"})),
                &WriteOptions::default(),
            )
            .unwrap();
        assert_eq!(meta.key, "alice");
        assert_eq!(meta.id, "person/alice");

        let stored = store.fetch("person", "alice").unwrap();
        assert_eq!(stored.id(), Some("person/alice"));
        assert_eq!(stored.rev(), Some(meta.rev.as_str()));
        assert_eq!(stored.get_str("name"), Some("Alice"));
    }

    #[test]
    fn test_insert_generates_keys() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();

        let first = store
            .insert("person", doc(json!({"n": 1})), &WriteOptions::default())
            .unwrap();
        let second = store
            .insert("person", doc(json!({"n": 2})), &WriteOptions::default())
            .unwrap();
        assert_ne!(first.key, second.key);
        assert_ne!(first.rev, second.rev);
    }

    #[test]
    fn test_insert_duplicate_and_invalid_keys() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        store
            .insert(
                "person",
                doc(json!({"_key": "alice"})),
                &WriteOptions::default(),
            )
            .unwrap();

        assert_eq!(
            store.insert(
                "person",
                doc(json!({"_key": "alice"})),
                &WriteOptions::default()
            ),
            Err(StoreError::DuplicateKey {
                collection: "person".to_string(),
                key: "alice".to_string(),
            })
        );
        assert_eq!(
            store.insert(
                "person",
                doc(json!({"_key": "a/b"})),
                &WriteOptions::default()
            ),
            Err(StoreError::InvalidKey("a/b".to_string()))
        );
    }

    #[test]
    fn test_replace_swaps_payload() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        let created = store
            .insert(
                "person",
                doc(json!({"_key": "alice", "name": "Alice", "age": 30})),
                &WriteOptions::default(),
            )
            .unwrap();

        let meta = store
            .replace(
                "person",
                "alice",
                doc(json!({"name": "Alice Cooper"})),
                &WriteOptions::default(),
            )
            .unwrap();
        assert_ne!(meta.rev, created.rev);

        let stored = store.fetch("person", "alice").unwrap();
        assert_eq!(stored.get_str("name"), Some("Alice Cooper"));
        assert!(stored.get("age").is_none());
        assert_eq!(stored.key(), Some("alice"));
    }

    #[test]
    fn test_update_merges_and_handles_null() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        store
            .insert(
                "person",
                doc(json!({"_key": "alice", "name": "Alice", "age": 30})),
                &WriteOptions::default(),
            )
            .unwrap();

        // default: null removes the field
        store
            .update(
                "person",
                "alice",
                doc(json!({"age": null, "city": "Berlin"})),
                &WriteOptions::default(),
            )
            .unwrap();
        let stored = store.fetch("person", "alice").unwrap();
        assert!(stored.get("age").is_none());
        assert_eq!(stored.get_str("city"), Some("Berlin"));

        // keep_null stores the null
        store
            .update(
                "person",
                "alice",
                doc(json!({"city": null})),
                &WriteOptions {
                    keep_null: true,
                    ..WriteOptions::default()
                },
            )
            .unwrap();
        let stored = store.fetch("person", "alice").unwrap();
        assert_eq!(stored.get("city"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_remove_returns_old_revision() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        let created = store
            .insert(
                "person",
                doc(json!({"_key": "alice"})),
                &WriteOptions::default(),
            )
            .unwrap();

        let removed = store
            .remove("person", "alice", &WriteOptions::default())
            .unwrap();
        assert_eq!(removed.rev, created.rev);
        assert!(matches!(
            store.fetch("person", "alice"),
            Err(StoreError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn test_scan() {
        let store = MemoryStore::new();
        store
            .create_collection("person", CollectionKind::Document)
            .unwrap();
        for name in ["alice", "bob", "charlie"] {
            store
                .insert(
                    "person",
                    doc(json!({"_key": name})),
                    &WriteOptions::default(),
                )
                .unwrap();
        }
        let all = store.scan("person").unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(
            store.scan("missing"),
            Err(StoreError::CollectionNotFound("missing".to_string()))
        );
    }
}
