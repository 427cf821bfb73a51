//! Named property graphs over the document store
//!
//! This module implements the graph-management core:
//! - Edge definitions shared across graphs with global uniqueness
//! - The registry of named graphs and their structural metadata
//! - Vertex/edge document access routed through graph membership checks

pub mod definition;
pub mod documents;
pub mod error;
pub mod registry;

// Re-export main types
pub use definition::{DefinitionTable, EdgeDefinition};
pub use error::{GraphError, GraphResult};
pub use registry::{GraphRecord, GraphRegistry, GRAPHS_COLLECTION};
