//! Grafton Graph Service
//!
//! A graph-management protocol layer: named property graphs built atop a
//! generic document store, with structural referential integrity and
//! HTTP conditional-request semantics.
//!
//! # Architecture
//!
//! - `store` — the narrow document-store interface and the bundled
//!   in-memory engine; the store owns keys and revision stamping.
//! - `graph` — edge definitions (shared across graphs, globally unique
//!   per collection), the registry of named graphs, and document access
//!   routed through graph membership checks.
//! - `http` — the axum request layer: route mapping, the
//!   If-Match/If-None-Match/rev precondition machine, and the uniform
//!   response envelope.
//! - `config` — server configuration.
//!
//! # Example Usage
//!
//! ```rust
//! use grafton::{EdgeDefinition, GraphRegistry, MemoryStore, WriteOptions};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let registry = GraphRegistry::open(Arc::new(MemoryStore::new())).unwrap();
//!
//! let knows = EdgeDefinition::new("knows", ["person"], ["person"]);
//! let graph = registry
//!     .create("social", vec![knows], vec![], &WriteOptions::default())
//!     .await
//!     .unwrap();
//! assert_eq!(graph.name, "social");
//! # });
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod http;
pub mod store;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use graph::{
    DefinitionTable, EdgeDefinition, GraphError, GraphRecord, GraphRegistry, GraphResult,
    GRAPHS_COLLECTION,
};
pub use store::{
    CollectionKind, Document, DocumentMeta, DocumentStore, MemoryStore, StoreError, StoreResult,
    WriteOptions,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
