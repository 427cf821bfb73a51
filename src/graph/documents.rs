//! Vertex and edge document access through a graph
//!
//! Every operation resolves the graph and checks that the target
//! collection is part of it before touching the store. Edge writes are
//! validated against the collection's edge definition.

use super::definition::EdgeDefinition;
use super::error::{GraphError, GraphResult};
use super::registry::GraphRegistry;
use crate::store::{
    document_handle, split_handle, Document, DocumentMeta, StoreError, WriteOptions, FROM_FIELD,
    TO_FIELD,
};
use serde_json::Value;
use tracing::debug;

impl GraphRegistry {
    /// Sorted vertex collection names of a graph.
    pub async fn vertex_collections(&self, graph: &str) -> GraphResult<Vec<String>> {
        let state = self.state.read().await;
        let entry = state.entry(graph)?;
        Ok(state.vertex_collections_of(entry).into_iter().collect())
    }

    /// Sorted edge collection names of a graph.
    pub async fn edge_collections(&self, graph: &str) -> GraphResult<Vec<String>> {
        let state = self.state.read().await;
        let entry = state.entry(graph)?;
        let mut names = entry.definitions.clone();
        names.sort_unstable();
        Ok(names)
    }

    /// Check that `collection` is a vertex collection of the graph.
    async fn resolve_vertex_collection(&self, graph: &str, collection: &str) -> GraphResult<()> {
        let state = self.state.read().await;
        let entry = state.entry(graph)?;
        if !state.vertex_collections_of(entry).contains(collection) {
            return Err(GraphError::CollectionNotFound(collection.to_string()));
        }
        Ok(())
    }

    /// Resolve `collection` to its edge definition within the graph.
    async fn resolve_edge_collection(
        &self,
        graph: &str,
        collection: &str,
    ) -> GraphResult<EdgeDefinition> {
        let state = self.state.read().await;
        let entry = state.entry(graph)?;
        if !entry.definitions.iter().any(|d| d == collection) {
            return Err(GraphError::CollectionNotFound(collection.to_string()));
        }
        state
            .definitions
            .get(collection)
            .cloned()
            .ok_or_else(|| GraphError::CollectionNotFound(collection.to_string()))
    }

    /// Store a new vertex document.
    pub async fn insert_vertex(
        &self,
        graph: &str,
        collection: &str,
        document: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_vertex_collection(graph, collection).await?;
        Ok(self.store.insert(collection, document, options)?)
    }

    /// Fetch a vertex document.
    pub async fn vertex(&self, graph: &str, collection: &str, key: &str) -> GraphResult<Document> {
        self.resolve_vertex_collection(graph, collection).await?;
        Ok(self.store.fetch(collection, key)?)
    }

    /// Replace a vertex document's payload.
    pub async fn replace_vertex(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        document: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_vertex_collection(graph, collection).await?;
        Ok(self.store.replace(collection, key, document, options)?)
    }

    /// Merge a patch into a vertex document.
    pub async fn update_vertex(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        patch: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_vertex_collection(graph, collection).await?;
        Ok(self.store.update(collection, key, patch, options)?)
    }

    /// Remove a vertex document together with every edge in the graph's
    /// edge collections that starts or ends at it.
    pub async fn remove_vertex(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_vertex_collection(graph, collection).await?;
        let edge_collections: Vec<String> = {
            let state = self.state.read().await;
            state.entry(graph)?.definitions.clone()
        };

        let meta = self.store.remove(collection, key, options)?;

        let handle = document_handle(collection, key);
        let mut cascaded = 0usize;
        for edge_collection in edge_collections {
            let edges = match self.store.scan(&edge_collection) {
                Ok(edges) => edges,
                Err(StoreError::CollectionNotFound(_)) => continue,
                Err(other) => return Err(other.into()),
            };
            for edge in edges {
                let incident = edge.from_handle() == Some(handle.as_str())
                    || edge.to_handle() == Some(handle.as_str());
                if !incident {
                    continue;
                }
                if let Some(edge_key) = edge.key() {
                    match self.store.remove(&edge_collection, edge_key, options) {
                        Ok(_) | Err(StoreError::DocumentNotFound { .. }) => cascaded += 1,
                        Err(other) => return Err(other.into()),
                    }
                }
            }
        }
        if cascaded > 0 {
            debug!(graph, vertex = %handle, edges = cascaded, "removed incident edges");
        }
        Ok(meta)
    }

    /// Store a new edge document. `_from` and `_to` must be handles into
    /// collections permitted by the edge definition.
    pub async fn insert_edge(
        &self,
        graph: &str,
        collection: &str,
        document: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        let definition = self.resolve_edge_collection(graph, collection).await?;
        validate_endpoints(&definition, &document)?;
        Ok(self.store.insert(collection, document, options)?)
    }

    /// Fetch an edge document.
    pub async fn edge(&self, graph: &str, collection: &str, key: &str) -> GraphResult<Document> {
        self.resolve_edge_collection(graph, collection).await?;
        Ok(self.store.fetch(collection, key)?)
    }

    /// Replace an edge document's payload. The stored `_from`/`_to` are
    /// kept; values in the body are ignored.
    pub async fn replace_edge(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        mut document: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_edge_collection(graph, collection).await?;
        let current = self.store.fetch(collection, key)?;
        if let Some(from) = current.from_handle() {
            document.insert(FROM_FIELD, Value::from(from));
        }
        if let Some(to) = current.to_handle() {
            document.insert(TO_FIELD, Value::from(to));
        }
        Ok(self.store.replace(collection, key, document, options)?)
    }

    /// Merge a patch into an edge document, ignoring `_from`/`_to`.
    pub async fn update_edge(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        mut patch: Document,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_edge_collection(graph, collection).await?;
        patch.remove(FROM_FIELD);
        patch.remove(TO_FIELD);
        Ok(self.store.update(collection, key, patch, options)?)
    }

    /// Remove an edge document.
    pub async fn remove_edge(
        &self,
        graph: &str,
        collection: &str,
        key: &str,
        options: &WriteOptions,
    ) -> GraphResult<DocumentMeta> {
        self.resolve_edge_collection(graph, collection).await?;
        Ok(self.store.remove(collection, key, options)?)
    }
}

/// Check an edge body's `_from`/`_to` against the definition.
fn validate_endpoints(definition: &EdgeDefinition, document: &Document) -> GraphResult<()> {
    let from = document
        .from_handle()
        .ok_or_else(|| GraphError::InvalidEdge("missing _from attribute".to_string()))?;
    let to = document
        .to_handle()
        .ok_or_else(|| GraphError::InvalidEdge("missing _to attribute".to_string()))?;

    let (from_collection, _) = split_handle(from)
        .ok_or_else(|| GraphError::InvalidEdge(format!("illegal handle '{}'", from)))?;
    let (to_collection, _) = split_handle(to)
        .ok_or_else(|| GraphError::InvalidEdge(format!("illegal handle '{}'", to)))?;

    if !definition.from.contains(from_collection) {
        return Err(GraphError::InvalidEdge(format!(
            "'{}' is not a permitted source collection for '{}'",
            from_collection, definition.collection
        )));
    }
    if !definition.to.contains(to_collection) {
        return Err(GraphError::InvalidEdge(format!(
            "'{}' is not a permitted target collection for '{}'",
            to_collection, definition.collection
        )));
    }
    Ok(())
}
