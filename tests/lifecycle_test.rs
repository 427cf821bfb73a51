//! Comprehensive registry/store lifecycle test
//!
//! Walks one store through the whole life of two graphs sharing an edge
//! definition: creation, structural edits, definition sharing, document
//! traffic, and teardown with collection cleanup.

use grafton::{
    DocumentStore, EdgeDefinition, GraphError, GraphRegistry, MemoryStore, WriteOptions,
};
use serde_json::json;
use std::sync::Arc;

fn doc(value: serde_json::Value) -> grafton::Document {
    grafton::Document::from_value(value).unwrap()
}

#[tokio::test]
async fn test_two_graphs_sharing_a_definition() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let options = WriteOptions::default();

    // ------------------------------------------------------------------
    // Phase 1: two graphs, one shared edge definition
    // ------------------------------------------------------------------
    let registry = GraphRegistry::open(Arc::clone(&store)).unwrap();
    let knows = EdgeDefinition::new("knows", ["person"], ["person"]);

    registry
        .create("social", vec![knows.clone()], vec![], &options)
        .await
        .unwrap();
    registry
        .create("work", vec![knows.clone()], vec!["company".to_string()], &options)
        .await
        .unwrap();

    assert!(store.has_collection("knows"));
    assert!(store.has_collection("person"));
    assert!(store.has_collection("company"));

    // ------------------------------------------------------------------
    // Phase 2: the shared record is one object, not two copies
    // ------------------------------------------------------------------
    let widened = EdgeDefinition::new("knows", ["person", "company"], ["person"]);
    registry
        .edit_edge_definition("work", "knows", widened.clone(), &options)
        .await
        .unwrap();

    let social = registry.get("social").await.unwrap();
    let work = registry.get("work").await.unwrap();
    assert_eq!(social.edge_definitions, vec![widened.clone()]);
    assert_eq!(work.edge_definitions, vec![widened]);
    // "company" was an orphan of "work" and is now referenced
    assert!(work.orphan_collections.is_empty());

    // ------------------------------------------------------------------
    // Phase 3: document traffic across the shared collections
    // ------------------------------------------------------------------
    registry
        .insert_vertex("social", "person", doc(json!({"_key": "alice"})), &options)
        .await
        .unwrap();
    registry
        .insert_vertex("work", "company", doc(json!({"_key": "acme"})), &options)
        .await
        .unwrap();
    registry
        .insert_edge(
            "work",
            "knows",
            doc(json!({"_from": "company/acme", "_to": "person/alice"})),
            &options,
        )
        .await
        .unwrap();

    // the widened definition applies to "social" too
    registry
        .insert_edge(
            "social",
            "knows",
            doc(json!({"_from": "company/acme", "_to": "person/alice"})),
            &options,
        )
        .await
        .unwrap();

    // but "company" never became a vertex collection of "social"
    assert_eq!(
        registry
            .insert_vertex("social", "company", doc(json!({})), &options)
            .await,
        Err(GraphError::CollectionNotFound("company".to_string()))
    );

    // ------------------------------------------------------------------
    // Phase 4: a fresh registry on the same store sees everything
    // ------------------------------------------------------------------
    let reopened = GraphRegistry::open(Arc::clone(&store)).unwrap();
    let names: Vec<String> = reopened
        .list()
        .await
        .into_iter()
        .map(|graph| graph.name)
        .collect();
    assert_eq!(names, vec!["social".to_string(), "work".to_string()]);
    assert_eq!(
        reopened.get("work").await.unwrap().edge_definitions,
        registry.get("work").await.unwrap().edge_definitions
    );

    // ------------------------------------------------------------------
    // Phase 5: teardown respects sharing
    // ------------------------------------------------------------------
    registry.drop("work", true, &options).await.unwrap();
    // everything "work" used is still needed by "social"
    assert!(store.has_collection("knows"));
    assert!(store.has_collection("person"));
    assert!(store.has_collection("company"));

    registry.drop("social", true, &options).await.unwrap();
    assert!(!store.has_collection("knows"));
    assert!(!store.has_collection("person"));
    assert!(!store.has_collection("company"));
    assert_eq!(
        registry.get("social").await,
        Err(GraphError::GraphNotFound("social".to_string()))
    );
}
