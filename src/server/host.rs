//! Server host holding the state every exposure needs
//!
//! The host is built once by [`ServerBuilder`](super::ServerBuilder) and is
//! the single source of truth for the application state.

use crate::config::RelationsConfig;
use crate::core::query::PaginationConfig;
use crate::core::service::RecordStore;
use crate::links::handlers::AppState;
use crate::links::registry::RelationRegistry;
use crate::server::entity_registry::TableRegistry;
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// Host context containing all application state
pub struct ServerHost {
    /// Store holding every table
    pub store: Arc<dyn RecordStore>,

    /// Relation route registry for `/{table}/{id}/{route}` resolution
    pub registry: Arc<RelationRegistry>,

    /// Table registry for CRUD routes
    pub table_registry: TableRegistry,

    pub pagination: PaginationConfig,

    /// Name reported by the health endpoints
    pub service_name: String,
}

impl ServerHost {
    /// Build the host from builder components
    ///
    /// Every registered table must be part of the store's schema, and every
    /// relation must match it.
    pub fn from_builder_components(
        store: Arc<dyn RecordStore>,
        relations: RelationsConfig,
        table_registry: TableRegistry,
        pagination: PaginationConfig,
        service_name: String,
    ) -> Result<Self> {
        for table in table_registry.table_names() {
            if store.schema().table(table).is_none() {
                return Err(anyhow!(
                    "table '{}' is registered but missing from the store schema",
                    table
                ));
            }
        }

        let registry = RelationRegistry::new(relations, store.schema())?;

        Ok(Self {
            store,
            registry: Arc::new(registry),
            table_registry,
            pagination,
            service_name,
        })
    }

    /// Handler state derived from the host
    pub fn app_state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            registry: self.registry.clone(),
            pagination: self.pagination,
        }
    }
}
