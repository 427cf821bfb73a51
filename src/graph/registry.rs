//! Registry of named graphs
//!
//! The registry owns the structural metadata: which edge definitions and
//! orphan vertex collections belong to which graph. Document contents stay
//! in the store; the registry only mirrors each graph as one metadata
//! document in the reserved `_graphs` collection, whose store-assigned
//! revision doubles as the graph revision.
//!
//! All structural mutations run under a single write lock. Editing a
//! definition shared by several graphs rewrites every affected metadata
//! document inside that critical section, so no reader ever observes a
//! partially applied edit.

use super::definition::{DefinitionTable, EdgeDefinition};
use super::error::{GraphError, GraphResult};
use crate::store::{
    document_handle, CollectionKind, Document, DocumentStore, StoreError, WriteOptions, KEY_FIELD,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Reserved store collection holding one metadata document per graph.
pub const GRAPHS_COLLECTION: &str = "_graphs";

/// Wire snapshot of a graph's structural metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRecord {
    pub name: String,
    #[serde(rename = "edgeDefinitions")]
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(rename = "orphanCollections")]
    pub orphan_collections: BTreeSet<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug)]
pub(super) struct GraphEntry {
    pub(super) rev: String,
    /// Edge collection names in definition order; the records live in the
    /// shared table.
    pub(super) definitions: Vec<String>,
    pub(super) orphans: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub(super) struct RegistryState {
    pub(super) graphs: IndexMap<String, GraphEntry>,
    pub(super) definitions: DefinitionTable,
}

impl RegistryState {
    pub(super) fn entry(&self, name: &str) -> GraphResult<&GraphEntry> {
        self.graphs
            .get(name)
            .ok_or_else(|| GraphError::GraphNotFound(name.to_string()))
    }

    /// Resolve a graph's definition names against the shared table.
    pub(super) fn materialize(&self, entry: &GraphEntry) -> Vec<EdgeDefinition> {
        entry
            .definitions
            .iter()
            .filter_map(|name| self.definitions.get(name))
            .cloned()
            .collect()
    }

    pub(super) fn record(&self, name: &str) -> GraphResult<GraphRecord> {
        let entry = self.entry(name)?;
        Ok(GraphRecord {
            name: name.to_string(),
            edge_definitions: self.materialize(entry),
            orphan_collections: entry.orphans.clone(),
            id: document_handle(GRAPHS_COLLECTION, name),
            rev: entry.rev.clone(),
        })
    }

    /// Vertex collections of one graph: orphans plus everything its
    /// definitions reference.
    pub(super) fn vertex_collections_of(&self, entry: &GraphEntry) -> BTreeSet<String> {
        let mut result = entry.orphans.clone();
        for def in self.materialize(entry) {
            result.extend(def.vertex_collections().cloned());
        }
        result
    }

    /// Union of vertex collections across every graph.
    fn all_vertex_collections(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        for entry in self.graphs.values() {
            result.extend(self.vertex_collections_of(entry));
        }
        result
    }

    /// Whether any of the graph's definitions reference `name` as a
    /// vertex collection.
    fn references_vertex(&self, entry: &GraphEntry, name: &str) -> bool {
        entry
            .definitions
            .iter()
            .filter_map(|def| self.definitions.get(def))
            .any(|def| def.references(name))
    }

    /// Whether any graph still uses `name` as an edge collection, a
    /// referenced vertex collection, or an orphan.
    fn collection_in_use(&self, name: &str) -> bool {
        self.graphs.values().any(|entry| {
            entry.definitions.iter().any(|def| def == name)
                || entry.orphans.contains(name)
                || self.references_vertex(entry, name)
        })
    }
}

fn validate_graph_name(name: &str) -> GraphResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(GraphError::InvalidGraphName(name.to_string()));
    }
    Ok(())
}

fn validate_collection_name(name: &str) -> GraphResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(GraphError::InvalidVertexCollection(name.to_string()));
    }
    Ok(())
}

fn metadata_document(definitions: &[EdgeDefinition], orphans: &BTreeSet<String>) -> Document {
    let mut doc = Document::new();
    doc.insert("edgeDefinitions", json!(definitions));
    doc.insert("orphanCollections", json!(orphans));
    doc
}

/// Owns the set of named graphs and their shared edge definitions.
pub struct GraphRegistry {
    pub(super) store: Arc<dyn DocumentStore>,
    pub(super) state: RwLock<RegistryState>,
}

impl GraphRegistry {
    /// Open the registry on a store, creating the metadata collection if
    /// needed and loading any graphs already present.
    pub fn open(store: Arc<dyn DocumentStore>) -> GraphResult<Self> {
        store.create_collection(GRAPHS_COLLECTION, CollectionKind::Document)?;

        let mut state = RegistryState::default();
        for doc in store.scan(GRAPHS_COLLECTION)? {
            let name = doc
                .key()
                .ok_or_else(|| {
                    GraphError::StoreFailure("graph metadata document without a key".to_string())
                })?
                .to_string();
            let rev = doc.rev().unwrap_or_default().to_string();
            let definitions: Vec<EdgeDefinition> = match doc.get("edgeDefinitions") {
                Some(value) => serde_json::from_value(value.clone()).map_err(|err| {
                    GraphError::StoreFailure(format!(
                        "corrupt metadata for graph '{}': {}",
                        name, err
                    ))
                })?,
                None => Vec::new(),
            };
            let orphans: BTreeSet<String> = match doc.get("orphanCollections") {
                Some(value) => serde_json::from_value(value.clone()).map_err(|err| {
                    GraphError::StoreFailure(format!(
                        "corrupt metadata for graph '{}': {}",
                        name, err
                    ))
                })?,
                None => BTreeSet::new(),
            };

            let mut order = Vec::with_capacity(definitions.len());
            for def in definitions {
                order.push(def.collection.clone());
                state.definitions.register(def).map_err(|err| {
                    GraphError::StoreFailure(format!(
                        "conflicting metadata for graph '{}': {}",
                        name, err
                    ))
                })?;
            }
            state.graphs.insert(
                name,
                GraphEntry {
                    rev,
                    definitions: order,
                    orphans,
                },
            );
        }

        if !state.graphs.is_empty() {
            info!(graphs = state.graphs.len(), "loaded graph registry");
        }
        Ok(GraphRegistry {
            store,
            state: RwLock::new(state),
        })
    }

    /// All graphs, in creation order.
    pub async fn list(&self) -> Vec<GraphRecord> {
        let state = self.state.read().await;
        state
            .graphs
            .keys()
            .filter_map(|name| state.record(name).ok())
            .collect()
    }

    /// One graph by name.
    pub async fn get(&self, name: &str) -> GraphResult<GraphRecord> {
        self.state.read().await.record(name)
    }

    /// Create a graph from edge definitions and orphan collections,
    /// creating absent backing collections along the way.
    pub async fn create(
        &self,
        name: &str,
        definitions: Vec<EdgeDefinition>,
        orphans: Vec<String>,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        validate_graph_name(name)?;
        let mut state = self.state.write().await;
        if state.graphs.contains_key(name) {
            return Err(GraphError::GraphAlreadyExists(name.to_string()));
        }

        let mut order: Vec<String> = Vec::with_capacity(definitions.len());
        for def in &definitions {
            def.validate()?;
            if order.contains(&def.collection) {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "collection '{}' is used in more than one definition",
                    def.collection
                )));
            }
            order.push(def.collection.clone());
        }

        // type segregation: edge collections are never vertex collections
        // and vice versa, across all graphs and within this request
        let mut staged = state.definitions.clone();
        let vertex_collections = state.all_vertex_collections();
        for def in &definitions {
            if vertex_collections.contains(&def.collection) {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "'{}' is already a vertex collection",
                    def.collection
                )));
            }
            for vertex in def.vertex_collections() {
                if state.definitions.contains(vertex) || order.contains(vertex) {
                    return Err(GraphError::InvalidEdgeDefinition(format!(
                        "'{}' is already an edge collection",
                        vertex
                    )));
                }
            }
            staged.register(def.clone())?;
        }

        let mut orphan_set = BTreeSet::new();
        for orphan in orphans {
            validate_collection_name(&orphan)?;
            if staged.contains(&orphan) || definitions.iter().any(|def| def.references(&orphan)) {
                return Err(GraphError::InvalidVertexCollection(orphan));
            }
            orphan_set.insert(orphan);
        }

        for def in &definitions {
            self.ensure_edge_collection(&def.collection)?;
            for vertex in def.vertex_collections() {
                self.ensure_vertex_collection(vertex)?;
            }
        }
        for orphan in &orphan_set {
            self.ensure_vertex_collection(orphan)?;
        }

        let mut doc = metadata_document(&definitions, &orphan_set);
        doc.insert(KEY_FIELD, Value::from(name));
        let meta = self.store.insert(GRAPHS_COLLECTION, doc, options)?;

        state.definitions = staged;
        state.graphs.insert(
            name.to_string(),
            GraphEntry {
                rev: meta.rev,
                definitions: order,
                orphans: orphan_set,
            },
        );
        info!(graph = name, "created graph");
        state.record(name)
    }

    /// Drop a graph. With `drop_collections`, backing collections used by
    /// no surviving graph are dropped as well.
    pub async fn drop(
        &self,
        name: &str,
        drop_collections: bool,
        options: &WriteOptions,
    ) -> GraphResult<()> {
        let mut state = self.state.write().await;
        let entry = state
            .graphs
            .shift_remove(name)
            .ok_or_else(|| GraphError::GraphNotFound(name.to_string()))?;

        // collect candidates before the definition records disappear
        let mut candidates: BTreeSet<String> = entry.orphans.clone();
        for def_name in &entry.definitions {
            candidates.insert(def_name.clone());
            if let Some(def) = state.definitions.get(def_name) {
                candidates.extend(def.vertex_collections().cloned());
            }
        }

        // the metadata removal itself is idempotent
        match self.store.remove(GRAPHS_COLLECTION, name, options) {
            Ok(_) | Err(StoreError::DocumentNotFound { .. }) => {}
            Err(other) => return Err(other.into()),
        }

        for def_name in &entry.definitions {
            let shared = state
                .graphs
                .values()
                .any(|other| other.definitions.iter().any(|d| d == def_name));
            if !shared {
                state.definitions.retire(def_name);
            }
        }

        if drop_collections {
            for collection in candidates {
                if !state.collection_in_use(&collection) && self.store.has_collection(&collection)
                {
                    self.store.drop_collection(&collection)?;
                }
            }
        }
        info!(graph = name, "dropped graph");
        Ok(())
    }

    /// Attach a vertex collection to the graph's orphan set. Already
    /// attached collections are left alone.
    pub async fn add_vertex_collection(
        &self,
        graph: &str,
        collection: &str,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        validate_collection_name(collection)?;
        let mut state = self.state.write().await;
        let entry = state.entry(graph)?;

        if entry.orphans.contains(collection) || state.references_vertex(entry, collection) {
            return state.record(graph);
        }
        if state.definitions.contains(collection) {
            return Err(GraphError::InvalidVertexCollection(collection.to_string()));
        }

        self.ensure_vertex_collection(collection)?;
        if let Some(entry) = state.graphs.get_mut(graph) {
            entry.orphans.insert(collection.to_string());
        }
        self.persist(&mut state, graph, options)?;
        debug!(graph, collection, "added vertex collection");
        state.record(graph)
    }

    /// Detach a vertex collection from the graph. Fails while any edge
    /// definition of the graph references it, regardless of `drop`.
    pub async fn remove_vertex_collection(
        &self,
        graph: &str,
        collection: &str,
        drop: bool,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        let mut state = self.state.write().await;
        let entry = state.entry(graph)?;

        if state.references_vertex(entry, collection) {
            return Err(GraphError::VertexCollectionStillReferenced {
                graph: graph.to_string(),
                collection: collection.to_string(),
            });
        }
        if !entry.orphans.contains(collection) {
            return Err(GraphError::CollectionNotFound(collection.to_string()));
        }

        if let Some(entry) = state.graphs.get_mut(graph) {
            entry.orphans.remove(collection);
        }
        self.persist(&mut state, graph, options)?;

        if drop && !state.collection_in_use(collection) && self.store.has_collection(collection) {
            self.store.drop_collection(collection)?;
        }
        debug!(graph, collection, "removed vertex collection");
        state.record(graph)
    }

    /// Append an edge definition to the graph. An identical definition
    /// already owned by another graph is shared; a conflicting one fails.
    pub async fn extend_edge_definitions(
        &self,
        graph: &str,
        definition: EdgeDefinition,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        definition.validate()?;
        let mut state = self.state.write().await;
        let entry = state.entry(graph)?;

        if entry.definitions.iter().any(|d| *d == definition.collection) {
            return Err(GraphError::InvalidEdgeDefinition(format!(
                "graph '{}' already has a definition for '{}'",
                graph, definition.collection
            )));
        }
        if state.all_vertex_collections().contains(&definition.collection) {
            return Err(GraphError::InvalidEdgeDefinition(format!(
                "'{}' is already a vertex collection",
                definition.collection
            )));
        }
        for vertex in definition.vertex_collections() {
            if state.definitions.contains(vertex) {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "'{}' is already an edge collection",
                    vertex
                )));
            }
        }
        if let Some(existing) = state.definitions.get(&definition.collection) {
            if *existing != definition {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "collection '{}' is already used with a different definition",
                    definition.collection
                )));
            }
        }

        self.ensure_edge_collection(&definition.collection)?;
        for vertex in definition.vertex_collections() {
            self.ensure_vertex_collection(vertex)?;
        }

        state.definitions.register(definition.clone())?;
        if let Some(entry) = state.graphs.get_mut(graph) {
            entry.definitions.push(definition.collection.clone());
            entry.orphans.retain(|orphan| !definition.references(orphan));
        }
        self.persist(&mut state, graph, options)?;
        debug!(graph, collection = %definition.collection, "added edge definition");
        state.record(graph)
    }

    /// Replace an edge definition in place. Every graph sharing the
    /// definition observes the new from/to sets; each affected graph's
    /// orphan set is recomputed and its metadata rewritten before the
    /// write lock is released.
    pub async fn edit_edge_definition(
        &self,
        graph: &str,
        collection: &str,
        definition: EdgeDefinition,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        if definition.collection != collection {
            return Err(GraphError::EdgeDefinitionMismatch {
                expected: collection.to_string(),
                found: definition.collection.clone(),
            });
        }
        definition.validate()?;

        let mut state = self.state.write().await;
        let entry = state.entry(graph)?;
        if !entry.definitions.iter().any(|d| d == collection) {
            return Err(GraphError::CollectionNotFound(collection.to_string()));
        }
        for vertex in definition.vertex_collections() {
            if state.definitions.contains(vertex) {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "'{}' is already an edge collection",
                    vertex
                )));
            }
        }
        let old = state.definitions.get(collection).cloned().ok_or_else(|| {
            GraphError::StoreFailure(format!("definition record for '{}' is missing", collection))
        })?;

        for vertex in definition.vertex_collections() {
            self.ensure_vertex_collection(vertex)?;
        }
        state.definitions.replace(definition.clone());

        let affected: Vec<String> = state
            .graphs
            .iter()
            .filter(|(_, entry)| entry.definitions.iter().any(|d| d == collection))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &affected {
            let entry = state.entry(name)?;
            let mut orphans = entry.orphans.clone();
            for vertex in definition.vertex_collections() {
                orphans.remove(vertex);
            }
            for vertex in old.vertex_collections() {
                if !definition.references(vertex) && !state.references_vertex(entry, vertex) {
                    orphans.insert(vertex.clone());
                }
            }
            if let Some(entry) = state.graphs.get_mut(name) {
                entry.orphans = orphans;
            }
            self.persist(&mut state, name, options)?;
        }
        info!(
            collection,
            graphs = affected.len(),
            "replaced edge definition"
        );
        state.record(graph)
    }

    /// Remove an edge definition from the graph. Vertex collections it
    /// referenced stay attached as orphans; the shared record and the
    /// backing collection outlive the graph's reference while any other
    /// graph still uses them.
    pub async fn delete_edge_definition(
        &self,
        graph: &str,
        collection: &str,
        drop: bool,
        options: &WriteOptions,
    ) -> GraphResult<GraphRecord> {
        let mut state = self.state.write().await;
        let entry = state.entry(graph)?;
        let position = entry
            .definitions
            .iter()
            .position(|d| d == collection)
            .ok_or_else(|| GraphError::CollectionNotFound(collection.to_string()))?;

        let old = state.definitions.get(collection).cloned().ok_or_else(|| {
            GraphError::StoreFailure(format!("definition record for '{}' is missing", collection))
        })?;

        if let Some(entry) = state.graphs.get_mut(graph) {
            entry.definitions.remove(position);
        }
        let entry = state.entry(graph)?;
        let mut orphans = entry.orphans.clone();
        for vertex in old.vertex_collections() {
            if !state.references_vertex(entry, vertex) {
                orphans.insert(vertex.clone());
            }
        }
        if let Some(entry) = state.graphs.get_mut(graph) {
            entry.orphans = orphans;
        }
        self.persist(&mut state, graph, options)?;

        let shared = state
            .graphs
            .values()
            .any(|other| other.definitions.iter().any(|d| d == collection));
        if !shared {
            state.definitions.retire(collection);
            if drop && self.store.has_collection(collection) {
                self.store.drop_collection(collection)?;
            }
        }
        debug!(graph, collection, "removed edge definition");
        state.record(graph)
    }

    /// Rewrite a graph's metadata document and adopt the fresh revision.
    fn persist(
        &self,
        state: &mut RegistryState,
        name: &str,
        options: &WriteOptions,
    ) -> GraphResult<()> {
        let entry = state.entry(name)?;
        let doc = metadata_document(&state.materialize(entry), &entry.orphans);
        let meta = self.store.replace(GRAPHS_COLLECTION, name, doc, options)?;
        if let Some(entry) = state.graphs.get_mut(name) {
            entry.rev = meta.rev;
        }
        Ok(())
    }

    fn ensure_edge_collection(&self, name: &str) -> GraphResult<()> {
        self.store
            .create_collection(name, CollectionKind::Edge)
            .map_err(|err| match err {
                StoreError::CollectionKindMismatch(name) => GraphError::InvalidEdgeDefinition(
                    format!("'{}' already exists as a document collection", name),
                ),
                other => other.into(),
            })
    }

    fn ensure_vertex_collection(&self, name: &str) -> GraphResult<()> {
        self.store
            .create_collection(name, CollectionKind::Document)
            .map_err(|err| match err {
                StoreError::CollectionKindMismatch(name) => {
                    GraphError::InvalidVertexCollection(name)
                }
                other => other.into(),
            })
    }
}
