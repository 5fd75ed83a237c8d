//! Table registry for managing table descriptors and auto-generating CRUD routes

use crate::core::entity::Record;
use crate::core::error::{ApiError, ApiResult, RecordError};
use crate::core::schema::TableSchema;
use crate::links::handlers::AppState;
use crate::server::handlers::{
    create_record, delete_record, get_record, list_records, update_record,
};
use axum::Router;
use axum::routing::get;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Trait that describes how to build routes for a table
pub trait TableDescriptor: Send + Sync {
    /// Table name, also the route segment (e.g. "dishes")
    fn table_name(&self) -> &str;

    fn schema(&self) -> TableSchema;

    /// Read a raw row as the table's record type and write it back as JSON
    ///
    /// Fails when the row is missing a column or a column has the wrong type.
    fn typed_row(&self, row: Value) -> ApiResult<Value>;

    /// Build the CRUD routes for this table
    ///
    /// - GET/POST /{table}
    /// - GET/PUT/DELETE /{table}/{id}
    fn build_routes(&self) -> Router<AppState>;
}

/// CRUD descriptor for a [`Record`] type
pub struct RecordDescriptor<T: Record> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RecordDescriptor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Default for RecordDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> TableDescriptor for RecordDescriptor<T> {
    fn table_name(&self) -> &str {
        T::table_name()
    }

    fn schema(&self) -> TableSchema {
        T::schema()
    }

    fn typed_row(&self, row: Value) -> ApiResult<Value> {
        let serialization_error = |e: serde_json::Error| -> ApiError {
            RecordError::SerializationError {
                table: T::table_name().to_string(),
                message: e.to_string(),
            }
            .into()
        };
        let record: T = serde_json::from_value(row).map_err(serialization_error)?;
        serde_json::to_value(&record).map_err(serialization_error)
    }

    fn build_routes(&self) -> Router<AppState> {
        let collection = format!("/{}", T::table_name());
        let item = format!("/{}/{{id}}", T::table_name());

        Router::new()
            .route(&collection, get(list_records::<T>).post(create_record::<T>))
            .route(
                &item,
                get(get_record::<T>)
                    .put(update_record::<T>)
                    .delete(delete_record::<T>),
            )
    }
}

/// Registry for all tables in the application
#[derive(Default)]
pub struct TableRegistry {
    descriptors: BTreeMap<String, Box<dyn TableDescriptor>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// Register a table descriptor, keyed by table name
    pub fn register(&mut self, descriptor: Box<dyn TableDescriptor>) {
        let table = descriptor.table_name().to_string();
        self.descriptors.insert(table, descriptor);
    }

    /// Register the descriptor of a record type
    pub fn register_record<T: Record>(&mut self) {
        self.register(Box::new(RecordDescriptor::<T>::new()));
    }

    /// Build a router with all registered table routes
    pub fn build_routes(&self) -> Router<AppState> {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    /// Round-trip a raw row through the record type registered for `table`
    pub fn typed_row(&self, table: &str, row: Value) -> ApiResult<Value> {
        let descriptor = self
            .descriptors
            .get(table)
            .ok_or_else(|| RecordError::UnknownTable {
                table: table.to_string(),
            })?;
        descriptor.typed_row(row)
    }

    pub fn schemas(&self) -> Vec<TableSchema> {
        self.descriptors.values().map(|d| d.schema()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDescriptor {
        table: &'static str,
    }

    impl TableDescriptor for MockDescriptor {
        fn table_name(&self) -> &str {
            self.table
        }

        fn schema(&self) -> TableSchema {
            TableSchema {
                name: self.table,
                singular: "mock",
                fields: &[],
                date_field: None,
                foreign_keys: &[],
                unique_keys: &[],
            }
        }

        fn typed_row(&self, row: Value) -> ApiResult<Value> {
            Ok(row)
        }

        fn build_routes(&self) -> Router<AppState> {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = TableRegistry::new();
        assert!(registry.table_names().is_empty());
    }

    #[test]
    fn test_register_replaces_same_table() {
        let mut registry = TableRegistry::new();
        registry.register(Box::new(MockDescriptor { table: "orders" }));
        registry.register(Box::new(MockDescriptor { table: "carts" }));
        registry.register(Box::new(MockDescriptor { table: "orders" }));
        assert_eq!(registry.table_names(), vec!["carts", "orders"]);
        assert_eq!(registry.schemas().len(), 2);
    }

    #[test]
    fn test_typed_row_of_unknown_table() {
        let registry = TableRegistry::new();
        let err = registry
            .typed_row("orders", serde_json::json!({}))
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_TABLE");
    }
}
