//! HTTP server exposing the graph-management API

use super::documents::{
    create_edge, create_vertex, delete_edge, delete_vertex, get_edge, get_vertex, replace_edge,
    replace_vertex, update_edge, update_vertex,
};
use super::graphs::{
    add_edge_definition, add_vertex_collection, create_graph, drop_graph, get_graph, list_graphs,
    list_edge_collections, list_vertex_collections, remove_edge_definition,
    remove_vertex_collection, replace_edge_definition,
};
use crate::config::ServerConfig;
use crate::graph::GraphRegistry;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the API router over a shared registry.
pub fn router(registry: Arc<GraphRegistry>) -> Router {
    Router::new()
        .route("/graphs", get(list_graphs).post(create_graph))
        .route("/graphs/:graph", get(get_graph).delete(drop_graph))
        .route(
            "/graphs/:graph/vertex",
            get(list_vertex_collections).post(add_vertex_collection),
        )
        .route(
            "/graphs/:graph/vertex/:collection",
            post(create_vertex).delete(remove_vertex_collection),
        )
        .route(
            "/graphs/:graph/vertex/:collection/:key",
            get(get_vertex)
                .put(replace_vertex)
                .patch(update_vertex)
                .delete(delete_vertex),
        )
        .route(
            "/graphs/:graph/edge",
            get(list_edge_collections).post(add_edge_definition),
        )
        .route(
            "/graphs/:graph/edge/:collection",
            post(create_edge)
                .put(replace_edge_definition)
                .delete(remove_edge_definition),
        )
        .route(
            "/graphs/:graph/edge/:collection/:key",
            get(get_edge)
                .put(replace_edge)
                .patch(update_edge)
                .delete(delete_edge),
        )
        .layer(CorsLayer::permissive())
        .with_state(registry)
}

/// HTTP server managing the graph API
pub struct HttpServer {
    registry: Arc<GraphRegistry>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(registry: Arc<GraphRegistry>, config: ServerConfig) -> Self {
        Self { registry, config }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> std::io::Result<()> {
        let app = router(Arc::clone(&self.registry));

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("graph API listening on http://{}", addr);

        axum::serve(listener, app).await
    }
}
