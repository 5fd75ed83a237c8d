//! Module system
//!
//! A module contributes a set of tables (with their CRUD routes) and the
//! relations between them.

use crate::config::RelationsConfig;
use crate::core::schema::{Schema, TableSchema};
use crate::server::entity_registry::TableRegistry;
use anyhow::Result;

/// A group of tables served together
pub trait Module: Send + Sync {
    /// Unique module name
    fn name(&self) -> &str;

    /// Module version
    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Schemas of the tables managed by this module
    fn tables(&self) -> Vec<TableSchema>;

    /// Load relations configuration
    fn relations_config(&self) -> Result<RelationsConfig>;

    /// Register the CRUD descriptor of every table
    fn register_tables(&self, registry: &mut TableRegistry);

    /// Registry holding the descriptor of every table of the module
    fn table_registry(&self) -> TableRegistry {
        let mut registry = TableRegistry::new();
        self.register_tables(&mut registry);
        registry
    }

    /// Schema holding every table of the module
    fn schema(&self) -> Schema {
        self.tables()
            .into_iter()
            .fold(Schema::new(), |schema, table| schema.with_table(table))
    }
}
