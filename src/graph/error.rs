//! Error taxonomy for graph operations
//!
//! Every kind carries a stable numeric code for the wire envelope; the
//! table lives here and never changes at runtime.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("graph '{0}' not found")]
    GraphNotFound(String),

    #[error("graph '{0}' already exists")]
    GraphAlreadyExists(String),

    #[error("illegal graph name '{0}'")]
    InvalidGraphName(String),

    #[error("collection '{0}' is not part of the graph")]
    CollectionNotFound(String),

    #[error("document '{collection}/{key}' not found")]
    DocumentNotFound { collection: String, key: String },

    #[error("document '{collection}/{key}' already exists")]
    DocumentAlreadyExists { collection: String, key: String },

    #[error("illegal document key '{0}'")]
    InvalidDocumentKey(String),

    #[error("vertex collection '{collection}' is referenced by an edge definition of graph '{graph}'")]
    VertexCollectionStillReferenced { graph: String, collection: String },

    #[error("invalid edge definition: {0}")]
    InvalidEdgeDefinition(String),

    #[error("edge definition '{expected}' does not match collection '{found}' in the body")]
    EdgeDefinitionMismatch { expected: String, found: String },

    #[error("'{0}' cannot be used as a vertex collection")]
    InvalidVertexCollection(String),

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("invalid vertex: {0}")]
    InvalidVertex(String),

    #[error("wrong revision")]
    WrongRevision,

    #[error("storage failure: {0}")]
    StoreFailure(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Stable numeric code carried in the error envelope.
    pub fn error_num(&self) -> u32 {
        match self {
            GraphError::StoreFailure(_) => 1000,
            GraphError::CollectionNotFound(_) => 1100,
            GraphError::DocumentNotFound { .. } => 1101,
            GraphError::WrongRevision => 1102,
            GraphError::InvalidDocumentKey(_) => 1103,
            GraphError::DocumentAlreadyExists { .. } => 1104,
            GraphError::GraphNotFound(_) => 1200,
            GraphError::GraphAlreadyExists(_) => 1201,
            GraphError::InvalidGraphName(_) => 1202,
            GraphError::InvalidEdgeDefinition(_) => 1203,
            GraphError::EdgeDefinitionMismatch { .. } => 1204,
            GraphError::VertexCollectionStillReferenced { .. } => 1205,
            GraphError::InvalidVertexCollection(_) => 1206,
            GraphError::InvalidEdge(_) => 1207,
            GraphError::InvalidVertex(_) => 1208,
        }
    }

    /// HTTP status the kind maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            GraphError::GraphNotFound(_)
            | GraphError::CollectionNotFound(_)
            | GraphError::DocumentNotFound { .. } => 404,
            GraphError::GraphAlreadyExists(_) | GraphError::DocumentAlreadyExists { .. } => 409,
            GraphError::WrongRevision => 412,
            GraphError::StoreFailure(_) => 500,
            _ => 400,
        }
    }
}

impl From<StoreError> for GraphError {
    /// Re-signal a collaborator failure as the nearest graph-level kind,
    /// preserving its message.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CollectionNotFound(name) => GraphError::CollectionNotFound(name),
            StoreError::DocumentNotFound { collection, key } => {
                GraphError::DocumentNotFound { collection, key }
            }
            StoreError::DuplicateKey { collection, key } => {
                GraphError::DocumentAlreadyExists { collection, key }
            }
            StoreError::InvalidKey(key) => GraphError::InvalidDocumentKey(key),
            other => GraphError::StoreFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let kinds = [
            GraphError::StoreFailure("x".into()),
            GraphError::CollectionNotFound("c".into()),
            GraphError::DocumentNotFound {
                collection: "c".into(),
                key: "k".into(),
            },
            GraphError::DocumentAlreadyExists {
                collection: "c".into(),
                key: "k".into(),
            },
            GraphError::InvalidDocumentKey("k".into()),
            GraphError::WrongRevision,
            GraphError::GraphNotFound("g".into()),
            GraphError::GraphAlreadyExists("g".into()),
            GraphError::InvalidGraphName("".into()),
            GraphError::InvalidEdgeDefinition("bad".into()),
            GraphError::EdgeDefinitionMismatch {
                expected: "a".into(),
                found: "b".into(),
            },
            GraphError::VertexCollectionStillReferenced {
                graph: "g".into(),
                collection: "c".into(),
            },
            GraphError::InvalidVertexCollection("c".into()),
            GraphError::InvalidEdge("bad".into()),
            GraphError::InvalidVertex("bad".into()),
        ];
        let mut nums: Vec<u32> = kinds.iter().map(GraphError::error_num).collect();
        nums.sort_unstable();
        nums.dedup();
        assert_eq!(nums.len(), kinds.len());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(GraphError::GraphNotFound("g".into()).http_status(), 404);
        assert_eq!(GraphError::GraphAlreadyExists("g".into()).http_status(), 409);
        assert_eq!(GraphError::WrongRevision.http_status(), 412);
        assert_eq!(
            GraphError::InvalidEdgeDefinition("bad".into()).http_status(),
            400
        );
        assert_eq!(GraphError::StoreFailure("x".into()).http_status(), 500);
    }

    #[test]
    fn test_store_errors_map_to_nearest_kind() {
        assert_eq!(
            GraphError::from(StoreError::CollectionNotFound("person".into())),
            GraphError::CollectionNotFound("person".into())
        );
        assert_eq!(
            GraphError::from(StoreError::DocumentNotFound {
                collection: "person".into(),
                key: "alice".into(),
            }),
            GraphError::DocumentNotFound {
                collection: "person".into(),
                key: "alice".into(),
            }
        );
        assert_eq!(
            GraphError::from(StoreError::InvalidKey("a/b".into())),
            GraphError::InvalidDocumentKey("a/b".into())
        );
        // other failures keep the collaborator message
        assert_eq!(
            GraphError::from(StoreError::CollectionKindMismatch("person".into())),
            GraphError::StoreFailure(
                "collection 'person' already exists with a different type".to_string()
            )
        );
    }
}
