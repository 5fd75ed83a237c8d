//! Table schemas and the foreign-key graph between them

use crate::core::error::{ApiError, RecordError};
use std::collections::{BTreeSet, VecDeque};

/// What happens to referencing rows when a referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// The delete is refused while references exist
    Restrict,
    /// Referencing rows are deleted first
    Cascade,
}

/// A foreign key declared on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Column holding the referenced id
    pub field: &'static str,
    /// Referenced table
    pub table: &'static str,
    pub on_delete: OnDelete,
}

/// Static description of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Plural name, also the route segment (e.g. "employees")
    pub name: &'static str,
    /// Singular name (e.g. "employee")
    pub singular: &'static str,
    /// Every column except `id`
    pub fields: &'static [&'static str],
    /// Column used by `from`/`to` range queries
    pub date_field: Option<&'static str>,
    pub foreign_keys: &'static [ForeignKey],
    /// Column sets that must be unique across the table
    pub unique_keys: &'static [&'static [&'static str]],
}

impl TableSchema {
    /// Whether `field` is a column of this table (including `id`)
    pub fn has_field(&self, field: &str) -> bool {
        field == "id" || self.fields.contains(&field)
    }
}

/// A foreign key seen from the referenced side
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    /// Table holding the foreign key
    pub from_table: &'static str,
    pub key: ForeignKey,
}

/// Registry of every table the API serves
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Register a table, replacing any table with the same name
    pub fn register(&mut self, table: TableSchema) {
        self.tables.retain(|t| t.name != table.name);
        self.tables.push(table);
    }

    /// Builder-style variant of [`Schema::register`]
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.register(table);
        self
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Look up a table or fail with `UNKNOWN_TABLE`
    pub fn require(&self, name: &str) -> Result<&TableSchema, ApiError> {
        self.table(name).ok_or_else(|| {
            RecordError::UnknownTable {
                table: name.to_string(),
            }
            .into()
        })
    }

    /// Every foreign key pointing at `table`
    pub fn references_to(&self, table: &str) -> Vec<Reference> {
        self.tables
            .iter()
            .flat_map(|t| {
                t.foreign_keys
                    .iter()
                    .filter(move |fk| fk.table == table)
                    .map(move |fk| Reference {
                        from_table: t.name,
                        key: *fk,
                    })
            })
            .collect()
    }

    /// Tables a write on `table` may read or touch
    ///
    /// That is the table itself, the tables it references, and every table
    /// reachable by walking references backwards (cascades and relocations),
    /// together with what those tables reference.
    pub fn involved_tables(&self, table: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([table.to_string()]);

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            for reference in self.references_to(&name) {
                queue.push_back(reference.from_table.to_string());
            }
        }

        let mut involved = seen.clone();
        for name in &seen {
            if let Some(schema) = self.table(name) {
                involved.extend(schema.foreign_keys.iter().map(|fk| fk.table.to_string()));
            }
        }

        involved.into_iter().collect()
    }
}
