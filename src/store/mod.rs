//! Generic keyed document collections with per-document revision stamping
//!
//! The graph layer consumes storage exclusively through the
//! [`DocumentStore`] trait; [`MemoryStore`] is the bundled engine.

mod document;
mod memory;

pub use document::{
    document_handle, split_handle, Document, DocumentMeta, FROM_FIELD, ID_FIELD, KEY_FIELD,
    REV_FIELD, TO_FIELD,
};
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("collection '{0}' already exists with a different type")]
    CollectionKindMismatch(String),

    #[error("document '{collection}/{key}' not found")]
    DocumentNotFound { collection: String, key: String },

    #[error("document '{collection}/{key}' already exists")]
    DuplicateKey { collection: String, key: String },

    #[error("illegal document key '{0}'")]
    InvalidKey(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Collection type: plain documents, or edges carrying `_from`/`_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Document,
    Edge,
}

/// Per-write options forwarded from the request layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Ask the store to sync the write to durable media before returning.
    pub wait_for_sync: bool,
    /// On partial updates, store explicit `null` values instead of
    /// removing the field.
    pub keep_null: bool,
}

/// Narrow interface to the underlying document store.
///
/// All calls complete synchronously. The store owns revision stamping:
/// every successful write assigns a fresh `_rev`, and the caller only ever
/// compares revisions, never produces them.
pub trait DocumentStore: Send + Sync {
    /// Create a collection. Creating an existing collection of the same
    /// kind is a no-op; a kind mismatch is an error.
    fn create_collection(&self, name: &str, kind: CollectionKind) -> StoreResult<()>;

    /// Drop a collection and all of its documents.
    fn drop_collection(&self, name: &str) -> StoreResult<()>;

    /// Whether a collection exists.
    fn has_collection(&self, name: &str) -> bool;

    /// Insert a new document. Honors a client-supplied `_key`, otherwise
    /// generates one. Stamps `_key`, `_id` and a fresh `_rev`.
    fn insert(
        &self,
        collection: &str,
        document: Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentMeta>;

    /// Fetch a document by key.
    fn fetch(&self, collection: &str, key: &str) -> StoreResult<Document>;

    /// Replace the payload of an existing document, stamping a fresh
    /// revision. System fields in the payload are ignored.
    fn replace(
        &self,
        collection: &str,
        key: &str,
        document: Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentMeta>;

    /// Merge a patch into an existing document, stamping a fresh revision.
    /// With `keep_null` unset, explicit `null` values remove the field.
    fn update(
        &self,
        collection: &str,
        key: &str,
        patch: Document,
        options: &WriteOptions,
    ) -> StoreResult<DocumentMeta>;

    /// Remove a document, returning the meta of the removed revision.
    fn remove(&self, collection: &str, key: &str, options: &WriteOptions)
        -> StoreResult<DocumentMeta>;

    /// Read every document of a collection.
    fn scan(&self, collection: &str) -> StoreResult<Vec<Document>>;
}
