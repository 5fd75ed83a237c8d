//! Loading configuration, relations and seed files from disk

use restaurant::config::{AppConfig, LogFormat, RelationVia, RelationsConfig, StorageBackend};
use restaurant::core::{Module, RecordStore};
use restaurant::core::error::ConfigError;
use restaurant::entities::{RestaurantModule, SeedData};
use restaurant::links::RelationRegistry;
use restaurant::server::ServerBuilder;
use restaurant::storage::InMemoryStore;
use std::io::Write;
use tempfile::NamedTempFile;

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

// =============================================================================
// AppConfig
// =============================================================================

#[test]
fn test_shipped_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/restaurant.yaml");
    let config = AppConfig::from_yaml_file(path).unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.storage.backend, StorageBackend::InMemory);
    assert_eq!(config.storage.seed.as_deref(), Some("data/seed.yaml"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_file_overrides_defaults() {
    let file = yaml_file(
        "server:\n  port: 9090\n  cors: true\nlogging:\n  format: json\nstorage:\n  backend: postgres\n  url: postgres://db/restaurant\n",
    );
    let config = AppConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:9090");
    assert!(config.server.cors);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.storage.backend, StorageBackend::Postgres);
    assert_eq!(config.storage.max_connections, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_config_file() {
    let err = AppConfig::from_yaml_file("/nonexistent/restaurant.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_malformed_config_file_names_the_file() {
    let file = yaml_file("server:\n  port: [not a port]\n");
    let err = AppConfig::from_yaml_file(file.path()).unwrap_err();
    match err {
        ConfigError::ParseError { file: Some(name), .. } => {
            assert_eq!(name, file.path().display().to_string());
        }
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn test_invalid_values_rejected() {
    let config = AppConfig::from_yaml_str("pagination:\n  default_limit: 200\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));

    let config = AppConfig::from_yaml_str("storage:\n  backend: postgres\n").unwrap();
    assert!(config.validate().is_err());
}

// =============================================================================
// Relations
// =============================================================================

#[test]
fn test_default_relations() {
    let config = RelationsConfig::default_config().unwrap();
    assert_eq!(config.relations.len(), 7);
    let employees = config
        .relations
        .iter()
        .find(|r| r.name == "location_employees")
        .unwrap();
    assert_eq!(
        employees.via,
        RelationVia::ForeignKey {
            field: "location_id".to_string()
        }
    );
}

#[test]
fn test_relations_file_with_unknown_field_rejected() {
    let file = yaml_file(
        r#"
relations:
  - name: dish_suppliers
    source: dishes
    target: suppliers
    forward_route_name: suppliers
    reverse_route_name: dishes
    via:
      kind: link_table
      table: dish_requirements
      source_field: dish_id
      target_field: supplier_id
"#,
    );
    let config = RelationsConfig::from_yaml_file(file.path()).unwrap();
    let err = RelationRegistry::new(config, &RestaurantModule.schema()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_route_declared_twice_rejected() {
    let extra = RelationsConfig::from_yaml_str(
        r#"
relations:
  - name: menu_locations_again
    source: locations
    target: menus
    forward_route_name: menus
    reverse_route_name: served-at
    via:
      kind: link_table
      table: location_menus
      source_field: location_id
      target_field: menu_id
"#,
    )
    .unwrap();
    let merged = RelationsConfig::merge(vec![RestaurantModule.relations_config().unwrap(), extra]);
    let err = RelationRegistry::new(merged, &RestaurantModule.schema()).unwrap_err();
    assert!(err.to_string().contains("declared twice"));
}

#[test]
fn test_builder_accepts_the_shipped_relations() {
    let store = InMemoryStore::new(RestaurantModule.schema());
    let built = ServerBuilder::new()
        .with_store(store)
        .register_module(RestaurantModule)
        .unwrap()
        .build();
    assert!(built.is_ok());
}

// =============================================================================
// Seed data
// =============================================================================

#[test]
fn test_shipped_seed_file_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/seed.yaml");
    let seed = SeedData::from_yaml_file(path).unwrap();
    assert_eq!(seed.tables.len(), 12);
    assert_eq!(seed.row_count(), 55);

    let order = seed.insertion_order(&RestaurantModule.schema()).unwrap();
    let position = |name: &str| order.iter().position(|t| t == name).unwrap();
    assert!(position("supply_categories") < position("dish_requirements"));
    assert!(position("dishes") < position("menu_dishes"));
}

#[tokio::test]
async fn test_seed_file_from_disk() {
    let file = yaml_file("dishes:\n  - name: Borscht\n    price: 6.5\n    weight_grams: 350\n    vegetarian: false\n");
    let seed = SeedData::from_yaml_file(file.path()).unwrap();
    let store = InMemoryStore::new(RestaurantModule.schema());
    let tables = RestaurantModule.table_registry();
    assert_eq!(seed.apply(&store, &tables).await.unwrap(), 1);
}

#[tokio::test]
async fn test_mistyped_seed_file_leaves_store_empty() {
    let file = yaml_file(
        "locations:\n  - name: Podil\n    address: 12 Khoryva St\n    city: Kyiv\n    opened_on: \"2019-04-12\"\n    seats: 60\nemployees:\n  - first_name: Olena\n    last_name: Koval\n    email: olena@example.com\n    position_id: 1\n    location_id: 1\n    hired_on: \"2022-09-01\"\n    salary: a lot\n",
    );
    let seed = SeedData::from_yaml_file(file.path()).unwrap();
    let store = InMemoryStore::new(RestaurantModule.schema());

    let err = seed
        .apply(&store, &RestaurantModule.table_registry())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("seeding employees row 1"));
    assert!(store.list("locations").await.unwrap().is_empty());
}
