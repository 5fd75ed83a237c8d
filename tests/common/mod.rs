//! Shared harness for the HTTP integration tests
//!
//! Every test gets its own in-memory store, optionally loaded with the
//! development dataset from `data/seed.yaml`.

#![allow(dead_code)]

use axum_test::TestServer;
use restaurant::core::Module;
use restaurant::core::query::PaginationConfig;
use restaurant::entities::{RestaurantModule, SeedData};
use restaurant::server::ServerBuilder;
use restaurant::storage::InMemoryStore;
use serde_json::Value;

pub const SEED_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/seed.yaml");

/// Server over an empty store
pub fn empty_server() -> TestServer {
    server_with(InMemoryStore::new(RestaurantModule.schema()), PaginationConfig::default())
}

/// Server over a store holding the development dataset
pub async fn seeded_server() -> TestServer {
    seeded_server_with(PaginationConfig::default()).await
}

pub async fn seeded_server_with(pagination: PaginationConfig) -> TestServer {
    let store = InMemoryStore::new(RestaurantModule.schema());
    SeedData::from_yaml_file(SEED_FILE)
        .expect("seed file should parse")
        .apply(&store, &RestaurantModule.table_registry())
        .await
        .expect("seed data should load");
    server_with(store, pagination)
}

fn server_with(store: InMemoryStore, pagination: PaginationConfig) -> TestServer {
    let app = ServerBuilder::new()
        .with_store(store)
        .with_pagination(pagination)
        .register_module(RestaurantModule)
        .expect("module should register")
        .build()
        .expect("router should build");
    TestServer::try_new(app).expect("Failed to create test server")
}

/// Ids of the rows in a list response, in response order
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|row| row["id"].as_i64().expect("row id"))
        .collect()
}

/// A field of every row in a list response, as strings
pub fn column(body: &Value, field: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|row| match &row[field] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}
