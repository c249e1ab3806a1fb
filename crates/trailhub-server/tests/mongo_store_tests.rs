//! MongoDB store integration tests
//!
//! These tests require Docker to be running. Run with:
//!
//! ```bash
//! cargo test --test mongo_store_tests -- --ignored --nocapture
//! ```

mod common;

use bson::doc;
use chrono::{Duration, Utc};
use common::TestMongo;
use futures::TryStreamExt;
use std::time::Duration as StdDuration;
use trailhub_server::{
    client_info::ClientInfo,
    config::DatabaseConfig,
    db::MongoGateway,
    features::logs::{
        FilterMode, LogDocument, LogFilter, LogStore, MongoLogStore, PageRequest, SortOrder,
    },
};

fn log(source: &str, user_id: Option<&str>, minutes_ago: i64) -> LogDocument {
    let mut doc = LogDocument::new(
        source.to_string(),
        format!("{} event", source),
        user_id.map(str::to_string),
        ClientInfo::default(),
    );
    doc.created = bson::DateTime::from_chrono(Utc::now() - Duration::minutes(minutes_ago)).to_chrono();
    doc
}

async fn store_for(mongo: &TestMongo, database: &str) -> (MongoGateway, MongoLogStore) {
    let gateway = MongoGateway::new(mongo.database_config(database), "TrailHub tests");
    let db = gateway.database().await.expect("Failed to connect to MongoDB");
    let store = MongoLogStore::new(&db, "logs", StdDuration::from_secs(10));
    (gateway, store)
}

#[tokio::test]
async fn test_gateway_fail_fast_on_unreachable_deployment() {
    let config = DatabaseConfig {
        uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500".to_string(),
        name: "trailhub_test".to_string(),
        collection: "logs".to_string(),
        timeout_secs: 1,
        fail_fast: true,
    };
    let gateway = MongoGateway::new(config, "TrailHub tests");

    assert!(gateway.database().await.is_err());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_gateway_reuses_client() {
    let mongo = TestMongo::start().await.expect("Failed to start MongoDB container");
    let gateway = MongoGateway::new(mongo.database_config("gateway"), "TrailHub tests");

    gateway.connect().await.expect("first connect");
    gateway.connect().await.expect("second connect");
    gateway.close().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_register_schema_creates_indexes() {
    let mongo = TestMongo::start().await.expect("Failed to start MongoDB container");
    let (gateway, store) = store_for(&mongo, "schema").await;

    store.register_schema().await.expect("register_schema");
    // idempotent
    store.register_schema().await.expect("register_schema again");

    let db = gateway.database().await.unwrap();
    let names: Vec<String> = db
        .collection::<bson::Document>("logs")
        .list_index_names()
        .await
        .unwrap();

    for field in ["created_1", "source_1", "user_id_1", "anonymous_1"] {
        assert!(names.iter().any(|n| n == field), "missing index {field}: {names:?}");
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_then_find_by_id() {
    let mongo = TestMongo::start().await.expect("Failed to start MongoDB container");
    let (_gateway, store) = store_for(&mongo, "insert").await;

    let stored = store.insert(log("billing", Some("u-1"), 0)).await.unwrap();
    let found = store.find_by_id(stored.id).await.unwrap();

    assert_eq!(found, Some(stored));
    assert_eq!(store.find_by_id(bson::oid::ObjectId::new()).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_page_filters_sorts_and_counts() {
    let mongo = TestMongo::start().await.expect("Failed to start MongoDB container");
    let (gateway, store) = store_for(&mongo, "paging").await;

    for (source, user, age) in [
        ("billing", Some("u-1"), 40),
        ("billing", None, 30),
        ("billing", None, 20),
        ("shipping", None, 10),
    ] {
        store.insert(log(source, user, age)).await.unwrap();
    }

    let filter = LogFilter {
        source: Some("billing".to_string()),
        anonymous: Some(true),
        ..Default::default()
    };

    let page = store
        .find_page(PageRequest {
            filter: filter.to_document(FilterMode::Conjunctive),
            sort: SortOrder::Desc,
            skip: 0,
            limit: 1,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.documents.len(), 1);
    assert!(page.documents[0].anonymous);
    assert_eq!(page.documents[0].source, "billing");

    let everything = store
        .find_page(PageRequest {
            filter: doc! {},
            sort: SortOrder::Asc,
            skip: 1,
            limit: 10,
        })
        .await
        .unwrap();

    assert_eq!(everything.total, 4);
    assert_eq!(everything.documents.len(), 3);
    assert!(everything
        .documents
        .windows(2)
        .all(|pair| pair[0].created <= pair[1].created));

    let raw: Vec<bson::Document> = gateway
        .database()
        .await
        .unwrap()
        .collection::<bson::Document>("logs")
        .find(doc! { "source": "shipping" }, None)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(raw[0].get_datetime("created").is_ok());
}
