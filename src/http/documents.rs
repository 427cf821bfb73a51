//! Handlers for vertex and edge documents
//!
//! Every mutating route runs the same machine: resolve the graph and
//! collection, fetch the current document, evaluate the request's
//! preconditions, and only then touch the store. A matching
//! `If-None-Match` answers 304 with no body; a failed expectation answers
//! 412 before any mutation happens.

use super::envelope::{creation_code, mutation_code, not_modified, success};
use super::params::DocumentQuery;
use super::revision::{check_revision, Preconditions, RevisionCheck};
use crate::graph::{GraphError, GraphRegistry, GraphResult};
use crate::store::Document;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// Evaluate the preconditions against the current document. `Some` is a
/// short-circuit response, `None` means carry on.
fn precheck(
    current: &Document,
    headers: &HeaderMap,
    rev: Option<String>,
) -> GraphResult<Option<Response>> {
    let preconditions = Preconditions::from_request(headers, rev);
    match check_revision(current.rev().unwrap_or_default(), &preconditions) {
        RevisionCheck::NotModified => Ok(Some(not_modified())),
        RevisionCheck::Mismatch => Err(GraphError::WrongRevision),
        RevisionCheck::Proceed => Ok(None),
    }
}

fn vertex_body(body: Value) -> GraphResult<Document> {
    Document::from_value(body)
        .ok_or_else(|| GraphError::InvalidVertex("expecting a JSON object".to_string()))
}

fn edge_body(body: Value) -> GraphResult<Document> {
    Document::from_value(body)
        .ok_or_else(|| GraphError::InvalidEdge("expecting a JSON object".to_string()))
}

/// POST /graphs/:graph/vertex/:collection
pub async fn create_vertex(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection)): Path<(String, String)>,
    Query(query): Query<DocumentQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let document = vertex_body(body)?;
    let meta = registry
        .insert_vertex(&graph, &collection, document, &query.write_options())
        .await?;
    Ok(success(
        creation_code(query.wait_for_sync),
        "vertex",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// GET /graphs/:graph/vertex/:collection/:key
pub async fn get_vertex(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Result<Response, GraphError> {
    let document = registry.vertex(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&document, &headers, query.rev)? {
        return Ok(response);
    }
    let etag = document.rev().map(str::to_string);
    Ok(success(
        StatusCode::OK,
        "vertex",
        document.to_value(),
        etag.as_deref(),
    ))
}

/// PUT /graphs/:graph/vertex/:collection/:key
pub async fn replace_vertex(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let current = registry.vertex(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    let document = vertex_body(body)?;
    let meta = registry
        .replace_vertex(&graph, &collection, &key, document, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "vertex",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// PATCH /graphs/:graph/vertex/:collection/:key
pub async fn update_vertex(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let current = registry.vertex(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    let patch = vertex_body(body)?;
    let meta = registry
        .update_vertex(&graph, &collection, &key, patch, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "vertex",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// DELETE /graphs/:graph/vertex/:collection/:key
pub async fn delete_vertex(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Result<Response, GraphError> {
    let current = registry.vertex(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    registry
        .remove_vertex(&graph, &collection, &key, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "removed",
        json!(true),
        None,
    ))
}

/// POST /graphs/:graph/edge/:collection
pub async fn create_edge(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection)): Path<(String, String)>,
    Query(query): Query<DocumentQuery>,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let document = edge_body(body)?;
    let meta = registry
        .insert_edge(&graph, &collection, document, &query.write_options())
        .await?;
    Ok(success(
        creation_code(query.wait_for_sync),
        "edge",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// GET /graphs/:graph/edge/:collection/:key
pub async fn get_edge(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Result<Response, GraphError> {
    let document = registry.edge(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&document, &headers, query.rev)? {
        return Ok(response);
    }
    let etag = document.rev().map(str::to_string);
    Ok(success(
        StatusCode::OK,
        "edge",
        document.to_value(),
        etag.as_deref(),
    ))
}

/// PUT /graphs/:graph/edge/:collection/:key
pub async fn replace_edge(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let current = registry.edge(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    let document = edge_body(body)?;
    let meta = registry
        .replace_edge(&graph, &collection, &key, document, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "edge",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// PATCH /graphs/:graph/edge/:collection/:key
pub async fn update_edge(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, GraphError> {
    let current = registry.edge(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    let patch = edge_body(body)?;
    let meta = registry
        .update_edge(&graph, &collection, &key, patch, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "edge",
        json!(meta),
        Some(&meta.rev),
    ))
}

/// DELETE /graphs/:graph/edge/:collection/:key
pub async fn delete_edge(
    State(registry): State<Arc<GraphRegistry>>,
    Path((graph, collection, key)): Path<(String, String, String)>,
    Query(query): Query<DocumentQuery>,
    headers: HeaderMap,
) -> Result<Response, GraphError> {
    let current = registry.edge(&graph, &collection, &key).await?;
    if let Some(response) = precheck(&current, &headers, query.rev.clone())? {
        return Ok(response);
    }
    registry
        .remove_edge(&graph, &collection, &key, &query.write_options())
        .await?;
    Ok(success(
        mutation_code(query.wait_for_sync),
        "removed",
        json!(true),
        None,
    ))
}
