//! Integration tests against a running MongoDB server.
//!
//! These tests require MongoDB to be reachable.
//! Set MONGODB_URI (default mongodb://localhost:27017) and run with --ignored.

use bson::{doc, Bson};
use docbridge_mongodb::{
    BulkWrite, Connection, ConnectionConfig, ConnectionRegistry, DocBridgeError, DocumentModel,
    DocumentStore, ModelConfig, Namespace, QueryOptions,
};

fn live_config() -> ConnectionConfig {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    ConnectionConfig {
        server_selection_timeout_secs: Some(5),
        ..ConnectionConfig::new(uri)
    }
}

async fn scratch_model(collection: &str) -> DocumentModel {
    let conn = Connection::connect(live_config()).await.unwrap();
    let model = DocumentModel::new(conn, ModelConfig::with_database("docbridge_it"));
    model.delete(collection, doc! {}).await.unwrap();
    model
}

#[tokio::test]
#[ignore]
async fn test_registry_returns_same_client() {
    let first = ConnectionRegistry::get_or_connect(|| Ok(live_config()))
        .await
        .unwrap();
    let second = ConnectionRegistry::get_instance().await.unwrap();
    assert!(ConnectionRegistry::is_initialized());
    assert_eq!(first.id(), second.id());

    let explicit = Connection::connect(live_config()).await.unwrap();
    assert_ne!(explicit.id(), first.id());
}

#[tokio::test]
#[ignore]
async fn test_crud_cycle() {
    let model = scratch_model("crud_cycle").await;

    let result = model
        .insert(
            "crud_cycle",
            doc! { "name": "John", "age": 30, "address": { "city": "Campinas", "zip": "13000" } },
        )
        .await
        .unwrap();
    assert_eq!(result.inserted_count, 1);
    let id = result.inserted_ids[0].clone();

    let found = model
        .find("crud_cycle", doc! { "name": "John" }, QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("_id"), Some(&id));
    assert_eq!(
        found[0].get_document("address").unwrap(),
        &doc! { "city": "Campinas", "zip": "13000" }
    );

    let updated = model
        .update("crud_cycle", doc! { "_id": id.clone() }, doc! { "name": "Jane" })
        .await
        .unwrap();
    assert_eq!(updated.matched_count, 1);
    assert_eq!(updated.modified_count, 1);

    let deleted = model
        .delete("crud_cycle", doc! { "_id": id.clone() })
        .await
        .unwrap();
    assert_eq!(deleted.deleted_count, 1);

    assert!(model
        .find_by_id("crud_cycle", id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore]
async fn test_update_single_without_upsert() {
    let model = scratch_model("update_single").await;
    model.insert("update_single", doc! { "age": 30, "name": "a" }).await.unwrap();
    model.insert("update_single", doc! { "age": 30, "name": "b" }).await.unwrap();

    let result = model
        .update("update_single", doc! { "age": 30 }, doc! { "name": "Jane" })
        .await
        .unwrap();
    assert_eq!(result.modified_count, 1);

    let janes = model
        .find("update_single", doc! { "name": "Jane" }, QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(janes.len(), 1);

    let missing = model
        .update("update_single", doc! { "_id": model.generate_id() }, doc! { "name": "x" })
        .await
        .unwrap();
    assert_eq!(missing.matched_count, 0);
    assert!(missing.upserted_ids.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_key_is_write_conflict() {
    let model = scratch_model("duplicates").await;
    let id = Bson::ObjectId(model.generate_id());
    model.insert("duplicates", doc! { "_id": id.clone() }).await.unwrap();

    let err = model
        .insert("duplicates", doc! { "_id": id })
        .await
        .unwrap_err();
    assert!(matches!(err, DocBridgeError::WriteConflict(_)), "{:?}", err);
}

#[tokio::test]
#[ignore]
async fn test_unreachable_server_fails_connect() {
    let config = ConnectionConfig {
        server_selection_timeout_secs: Some(1),
        ..ConnectionConfig::new("mongodb://127.0.0.1:1")
    };
    let err = Connection::connect(config).await.unwrap_err();
    assert!(matches!(err, DocBridgeError::Connection(_)));
}

#[tokio::test]
#[ignore]
async fn test_bulk_stops_at_first_write_error() {
    let conn = Connection::connect(live_config()).await.unwrap();
    let ns = Namespace::new("docbridge_it", "ordered_bulk").unwrap();
    let mut cleanup = BulkWrite::new();
    cleanup.delete(doc! {}, 0);
    conn.execute_bulk_write(&ns, cleanup).await.unwrap();

    let mut bulk = BulkWrite::new();
    bulk.insert(doc! { "_id": 1 });
    bulk.insert(doc! { "_id": 1 });
    bulk.insert(doc! { "_id": 2 });
    let result = conn.execute_bulk_write(&ns, bulk).await.unwrap();

    assert_eq!(result.inserted_count, 1);
    assert_eq!(result.write_errors.len(), 1);
    assert_eq!(result.write_errors[0].index, 1);
    assert_eq!(result.write_errors[0].code, 11000);

    let remaining = conn
        .execute_query(&ns, doc! { "_id": 2 }, QueryOptions::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_bulk_multi_update_and_upsert() {
    let conn = Connection::connect(live_config()).await.unwrap();
    let ns = Namespace::new("docbridge_it", "multi_upsert").unwrap();

    let mut bulk = BulkWrite::new();
    bulk.delete(doc! {}, 0);
    bulk.insert(doc! { "group": "a", "n": 1 });
    bulk.insert(doc! { "group": "a", "n": 2 });
    bulk.update(doc! { "group": "a" }, doc! { "$set": { "seen": true } }, true, false);
    bulk.update(doc! { "group": "b" }, doc! { "$set": { "n": 3 } }, false, true);
    let result = conn.execute_bulk_write(&ns, bulk).await.unwrap();

    assert_eq!(result.inserted_count, 2);
    assert_eq!(result.matched_count, 2);
    assert_eq!(result.modified_count, 2);
    assert_eq!(result.upserted_count, 1);
    assert_eq!(result.upserted_ids[0].0, 4);
}
