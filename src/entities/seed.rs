//! Seed dataset loaded at startup
//!
//! The dataset is a YAML mapping from table name to a list of rows:
//!
//! ```yaml
//! positions:
//!   - title: Chef
//!     base_salary: 2400
//! employees:
//!   - first_name: Olena
//!     position_id: 1
//!     ...
//! ```
//!
//! Rows receive ids in list order, so foreign keys may refer to the
//! position of a row in its list (1-based). Tables are inserted parents
//! first, whatever their order in the file.

use crate::core::error::ConfigError;
use crate::core::schema::Schema;
use crate::core::service::RecordStore;
use crate::core::tables::Workspace;
use crate::server::entity_registry::TableRegistry;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Rows to insert, per table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SeedData {
    pub tables: BTreeMap<String, Vec<Value>>,
}

impl SeedData {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Total number of rows in the dataset
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Tables of the dataset ordered so referenced tables come first
    ///
    /// Fails on a table missing from the schema or on a reference cycle.
    pub fn insertion_order(&self, schema: &Schema) -> Result<Vec<String>> {
        for table in self.tables.keys() {
            if schema.table(table).is_none() {
                return Err(anyhow!("seed data names unknown table '{}'", table));
            }
        }

        let mut placed: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.tables.len());

        while order.len() < self.tables.len() {
            let ready: Vec<&str> = self
                .tables
                .keys()
                .map(String::as_str)
                .filter(|table| !placed.contains(table))
                .filter(|table| {
                    schema.table(table).is_some_and(|t| {
                        t.foreign_keys.iter().all(|fk| {
                            fk.table == *table
                                || placed.contains(fk.table)
                                || !self.tables.contains_key(fk.table)
                        })
                    })
                })
                .collect();

            if ready.is_empty() {
                return Err(anyhow!("seed data tables reference each other in a cycle"));
            }
            for table in ready {
                placed.insert(table);
                order.push(table.to_string());
            }
        }

        Ok(order)
    }

    /// Check the whole dataset and return its rows in insertion order
    ///
    /// Every row is read as its table's record type, so a missing column or a
    /// mistyped value is rejected here instead of being stored. The rows are
    /// then inserted into an empty scratch workspace, which catches broken
    /// references and duplicates before the real store is touched.
    pub fn prepare(
        &self,
        schema: &Schema,
        tables: &TableRegistry,
    ) -> Result<Vec<(String, Vec<Value>)>> {
        let order = self.insertion_order(schema)?;
        let mut scratch = Workspace::new();
        let mut prepared = Vec::with_capacity(order.len());

        for table in order {
            let rows = self.tables.get(&table).map(Vec::as_slice).unwrap_or_default();
            let mut typed = Vec::with_capacity(rows.len());
            for (index, row) in rows.iter().enumerate() {
                let row = tables
                    .typed_row(&table, row.clone())
                    .and_then(|row| scratch.insert(schema, &table, row.clone()).map(|_| row))
                    .with_context(|| format!("seeding {} row {}", table, index + 1))?;
                typed.push(row);
            }
            prepared.push((table, typed));
        }

        Ok(prepared)
    }

    /// Insert every row through the store, parents first
    ///
    /// The dataset is checked in full by [`SeedData::prepare`] first, so a
    /// bad row leaves the store untouched. The store is expected to be
    /// empty; only a backend failure can stop the load halfway.
    ///
    /// Returns the number of inserted rows.
    pub async fn apply(&self, store: &dyn RecordStore, tables: &TableRegistry) -> Result<usize> {
        let prepared = self.prepare(store.schema(), tables)?;
        let mut inserted = 0;

        for (table, rows) in prepared {
            let count = rows.len();
            for (index, row) in rows.into_iter().enumerate() {
                store
                    .insert(&table, row)
                    .await
                    .with_context(|| format!("seeding {} row {}", table, index + 1))?;
                inserted += 1;
            }
            tracing::debug!(table = %table, rows = count, "seeded table");
        }

        tracing::info!(rows = inserted, "seed data loaded");
        Ok(inserted)
    }
}
