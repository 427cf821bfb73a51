//! Edge definitions and the shared definitions table
//!
//! An edge definition binds an edge collection to the vertex collections
//! its edges may start from and point to. The collection name is unique
//! across the definitions of every graph, so the table stores each
//! definition exactly once and graphs reference it by name; editing the
//! record is therefore visible to every graph that shares it.

use super::error::{GraphError, GraphResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rule binding an edge collection to permitted source/target vertex
/// collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// Edge collection the rule applies to.
    pub collection: String,
    /// Vertex collections edges may start from.
    pub from: BTreeSet<String>,
    /// Vertex collections edges may point to.
    pub to: BTreeSet<String>,
}

impl EdgeDefinition {
    pub fn new<I, J, S>(collection: impl Into<String>, from: I, to: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EdgeDefinition {
            collection: collection.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Reject structurally unusable definitions.
    pub fn validate(&self) -> GraphResult<()> {
        if self.collection.is_empty() || self.collection.contains('/') {
            return Err(GraphError::InvalidEdgeDefinition(format!(
                "illegal edge collection name '{}'",
                self.collection
            )));
        }
        if self.from.is_empty() || self.to.is_empty() {
            return Err(GraphError::InvalidEdgeDefinition(format!(
                "definition for '{}' needs at least one from and one to collection",
                self.collection
            )));
        }
        for name in self.vertex_collections() {
            if name.is_empty() || name.contains('/') {
                return Err(GraphError::InvalidEdgeDefinition(format!(
                    "illegal vertex collection name '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// All vertex collections the definition references.
    pub fn vertex_collections(&self) -> impl Iterator<Item = &String> {
        self.from.union(&self.to)
    }

    /// Whether the definition references `name` as a vertex collection.
    pub fn references(&self, name: &str) -> bool {
        self.from.contains(name) || self.to.contains(name)
    }
}

/// The process-wide set of edge definitions, keyed by edge collection
/// name. Owned by the registry; one record per collection no matter how
/// many graphs use it.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    records: IndexMap<String, EdgeDefinition>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        DefinitionTable::default()
    }

    pub fn get(&self, collection: &str) -> Option<&EdgeDefinition> {
        self.records.get(collection)
    }

    /// Whether `name` is a known edge collection.
    pub fn contains(&self, collection: &str) -> bool {
        self.records.contains_key(collection)
    }

    /// Register a definition. An identical record already present is
    /// shared; a differing record on the same collection name is refused.
    pub fn register(&mut self, definition: EdgeDefinition) -> GraphResult<()> {
        match self.records.get(&definition.collection) {
            Some(existing) if *existing == definition => Ok(()),
            Some(_) => Err(GraphError::InvalidEdgeDefinition(format!(
                "collection '{}' is already used with a different definition",
                definition.collection
            ))),
            None => {
                self.records
                    .insert(definition.collection.clone(), definition);
                Ok(())
            }
        }
    }

    /// Swap the record in place. The caller has already checked the
    /// collection names agree.
    pub fn replace(&mut self, definition: EdgeDefinition) {
        self.records
            .insert(definition.collection.clone(), definition);
    }

    /// Retire a record once no graph references it.
    pub fn retire(&mut self, collection: &str) -> Option<EdgeDefinition> {
        self.records.shift_remove(collection)
    }
}
