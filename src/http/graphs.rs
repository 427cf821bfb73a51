//! Handlers for graph management operations
//!
//! Listing, creation and removal of graphs, and the structural mutations:
//! vertex collections and edge definitions.

use super::envelope::{creation_code, mutation_code, success};
use super::params::{DropCollectionQuery, DropGraphQuery, SyncQuery};
use crate::graph::{EdgeDefinition, GraphError, GraphRecord, GraphRegistry, GraphResult};
use crate::store::WriteOptions;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CreateGraphRequest {
    name: String,
    edge_definitions: Vec<EdgeDefinition>,
    orphan_collections: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CollectionRequest {
    collection: String,
}

fn graph_response(code: StatusCode, graph: &GraphRecord) -> Response {
    success(code, "graph", json!(graph), Some(&graph.rev))
}

fn sync_options(wait_for_sync: bool) -> WriteOptions {
    WriteOptions {
        wait_for_sync,
        ..WriteOptions::default()
    }
}

fn parse_definition(body: Value) -> GraphResult<EdgeDefinition> {
    serde_json::from_value(body).map_err(|err| GraphError::InvalidEdgeDefinition(err.to_string()))
}

/// GET /graphs
pub async fn list_graphs(State(registry): State<Arc<GraphRegistry>>) -> Response {
    let graphs = registry.list().await;
    success(StatusCode::OK, "graphs", json!(graphs), None)
}

/// POST /graphs
pub async fn create_graph(
    State(registry): State<Arc<GraphRegistry>>,
    Query(query): Query<SyncQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let request: CreateGraphRequest = serde_json::from_value(body)
        .map_err(|err| GraphError::InvalidEdgeDefinition(err.to_string()))?;
    let graph = registry
        .create(
            &request.name,
            request.edge_definitions,
            request.orphan_collections,
            &sync_options(query.wait_for_sync),
        )
        .await?;
    Ok(graph_response(creation_code(query.wait_for_sync), &graph))
}

/// GET /graphs/:graph
pub async fn get_graph(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
) -> Result<Response, GraphError> {
    let graph = registry.get(&graph).await?;
    Ok(graph_response(StatusCode::OK, &graph))
}

/// DELETE /graphs/:graph
pub async fn drop_graph(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
    Query(query): Query<DropGraphQuery>,
) -> Result<Response, GraphError> {
    GraphRegistry::drop(&registry, &graph, query.drop_collections, &WriteOptions::default())
        .await?;
    Ok(success(StatusCode::OK, "removed", json!(true), None))
}

/// GET /graphs/:graph/vertex
pub async fn list_vertex_collections(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
) -> Result<Response, GraphError> {
    let collections = registry.vertex_collections(&graph).await?;
    Ok(success(StatusCode::OK, "collections", json!(collections), None))
}

/// POST /graphs/:graph/vertex
pub async fn add_vertex_collection(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
    Query(query): Query<SyncQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let request: CollectionRequest = serde_json::from_value(body)
        .map_err(|err| GraphError::InvalidVertexCollection(err.to_string()))?;
    let graph = registry
        .add_vertex_collection(
            &graph,
            &request.collection,
            &sync_options(query.wait_for_sync),
        )
        .await?;
    Ok(graph_response(creation_code(query.wait_for_sync), &graph))
}

/// DELETE /graphs/:graph/vertex/:collection
pub async fn remove_vertex_collection(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection)): Path<(String, String)>,
    Query(query): Query<DropCollectionQuery>,
) -> Result<Response, GraphError> {
    let graph = registry
        .remove_vertex_collection(
            &graph,
            &collection,
            query.drop_collection,
            &sync_options(query.wait_for_sync),
        )
        .await?;
    Ok(graph_response(mutation_code(query.wait_for_sync), &graph))
}

/// GET /graphs/:graph/edge
pub async fn list_edge_collections(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
) -> Result<Response, GraphError> {
    let collections = registry.edge_collections(&graph).await?;
    Ok(success(StatusCode::OK, "collections", json!(collections), None))
}

/// POST /graphs/:graph/edge
pub async fn add_edge_definition(
    State(registry): State<Arc<GraphRegistry>>,
    Path(graph): Path<String>,
    Query(query): Query<SyncQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let definition = parse_definition(body)?;
    let graph = registry
        .extend_edge_definitions(&graph, definition, &sync_options(query.wait_for_sync))
        .await?;
    Ok(graph_response(creation_code(query.wait_for_sync), &graph))
}

/// PUT /graphs/:graph/edge/:collection
pub async fn replace_edge_definition(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection)): Path<(String, String)>,
    Query(query): Query<SyncQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let definition = parse_definition(body)?;
    let graph = registry
        .edit_edge_definition(
            &graph,
            &collection,
            definition,
            &sync_options(query.wait_for_sync),
        )
        .await?;
    Ok(graph_response(mutation_code(query.wait_for_sync), &graph))
}

/// DELETE /graphs/:graph/edge/:collection
pub async fn remove_edge_definition(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection)): Path<(String, String)>,
    Query(query): Query<DropCollectionQuery>,
) -> Result<Response, GraphError> {
    let graph = registry
        .delete_edge_definition(
            &graph,
            &collection,
            query.drop_collection,
            &sync_options(query.wait_for_sync),
        )
        .await?;
    Ok(graph_response(mutation_code(query.wait_for_sync), &graph))
}
