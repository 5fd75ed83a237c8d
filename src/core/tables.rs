//! Row workspace shared by every storage backend
//!
//! A [`Workspace`] holds the rows of some tables as JSON objects keyed by id,
//! plus each table's identity counter. All write operations (insert, update,
//! compact delete) are implemented here once, against the [`Schema`], and
//! every mutation is recorded in a journal of [`Change`]s. The in-memory store
//! keeps a workspace as its state; relational backends load the involved
//! tables into a workspace, run the operation, and replay the journal inside
//! a transaction.
//!
//! Writes check everything that can fail before touching any row, so a
//! failed operation leaves the workspace untouched.

use crate::core::error::{
    ApiError, ApiResult, ConflictError, FieldValidationError, RecordError, ValidationError,
};
use crate::core::schema::{OnDelete, Schema, TableSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Rows and identity counter of one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub rows: BTreeMap<i64, Value>,
    /// Id handed to the next inserted row
    pub next_id: i64,
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl TableData {
    /// Highest id currently stored
    pub fn last_id(&self) -> Option<i64> {
        self.rows.keys().next_back().copied()
    }
}

/// One recorded mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert or overwrite a row
    Put { table: String, id: i64, row: Value },
    Remove { table: String, id: i64 },
    /// Set the identity counter
    Reseed { table: String, next_id: i64 },
}

/// Row moved into the slot freed by a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from: i64,
    pub to: i64,
}

/// Rows removed from a table by cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub table: String,
    pub count: usize,
}

/// Outcome of a compact deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub table: String,
    pub deleted_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocated: Option<Relocation>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cascaded: Vec<CascadeSummary>,
}

/// A set of tables plus the journal of changes applied to them
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    tables: HashMap<String, TableData>,
    journal: Vec<Change>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace around already-loaded tables
    pub fn from_tables(tables: HashMap<String, TableData>) -> Self {
        Self {
            tables,
            journal: Vec::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.get(name)
    }

    /// Rows of a table in id order (empty when the table was never written)
    pub fn rows(&self, name: &str) -> Vec<Value> {
        self.tables
            .get(name)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, table: &str, id: i64) -> Option<&Value> {
        self.tables.get(table).and_then(|t| t.rows.get(&id))
    }

    /// Drain the recorded changes
    pub fn take_journal(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.journal)
    }

    fn table_mut(&mut self, name: &str) -> &mut TableData {
        self.tables.entry(name.to_string()).or_default()
    }

    fn put(&mut self, table: &str, id: i64, row: Value) {
        self.table_mut(table).rows.insert(id, row.clone());
        self.journal.push(Change::Put {
            table: table.to_string(),
            id,
            row,
        });
    }

    fn remove(&mut self, table: &str, id: i64) {
        self.table_mut(table).rows.remove(&id);
        self.journal.push(Change::Remove {
            table: table.to_string(),
            id,
        });
    }

    fn reseed(&mut self, table: &str) {
        let data = self.table_mut(table);
        let next_id = data.last_id().map_or(1, |last| last + 1);
        data.next_id = next_id;
        self.journal.push(Change::Reseed {
            table: table.to_string(),
            next_id,
        });
    }

    // =========================================================================
    // Insert / update
    // =========================================================================

    /// Insert a row, assigning the next id of the table
    pub fn insert(&mut self, schema: &Schema, table: &str, row: Value) -> ApiResult<Value> {
        let table_schema = schema.require(table)?;
        let mut row = into_object(table, row)?;
        self.check_row(table_schema, None, &row)?;

        let data = self.table_mut(table);
        let id = data.next_id.max(data.last_id().map_or(1, |last| last + 1));
        data.next_id = id + 1;
        row.insert("id".to_string(), Value::from(id));
        let row = Value::Object(row);

        self.put(table, id, row.clone());
        self.journal.push(Change::Reseed {
            table: table.to_string(),
            next_id: id + 1,
        });
        Ok(row)
    }

    /// Replace the row stored under `id`
    pub fn update(&mut self, schema: &Schema, table: &str, id: i64, row: Value) -> ApiResult<Value> {
        let table_schema = schema.require(table)?;
        if self.get(table, id).is_none() {
            return Err(not_found(table, id));
        }

        let mut row = into_object(table, row)?;
        self.check_row(table_schema, Some(id), &row)?;
        row.insert("id".to_string(), Value::from(id));
        let row = Value::Object(row);

        self.put(table, id, row.clone());
        Ok(row)
    }

    /// Foreign-key existence and unique-key checks for a row about to be written
    fn check_row(
        &self,
        table: &TableSchema,
        own_id: Option<i64>,
        row: &serde_json::Map<String, Value>,
    ) -> ApiResult<()> {
        let mut errors = Vec::new();
        for fk in table.foreign_keys {
            match row.get(fk.field).and_then(Value::as_i64) {
                Some(target) if self.get(fk.table, target).is_some() => {}
                Some(target) => errors.push(FieldValidationError::new(
                    fk.field,
                    format!("references missing {} row {}", fk.table, target),
                )),
                None => errors.push(FieldValidationError::new(
                    fk.field,
                    format!("must be the id of a {} row", fk.table),
                )),
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::FieldErrors(errors).into());
        }

        let Some(existing) = self.tables.get(table.name) else {
            return Ok(());
        };
        for key in table.unique_keys {
            let collision = existing.rows.iter().any(|(id, other)| {
                Some(*id) != own_id
                    && key
                        .iter()
                        .all(|field| values_collide(row.get(*field), other.get(*field)))
            });
            if collision {
                return Err(ConflictError::Duplicate {
                    table: table.name.to_string(),
                    fields: key.iter().map(|f| f.to_string()).collect(),
                }
                .into());
            }
        }
        Ok(())
    }

    // =========================================================================
    // Compact deletion
    // =========================================================================

    /// Delete a row and keep the table's ids contiguous
    ///
    /// Rows referencing the deleted row through cascade keys are deleted
    /// first. The last row of the table then moves into the freed slot, every
    /// foreign key that pointed at the last row is rewritten, and the identity
    /// is reseeded so the next insert reuses the last id.
    pub fn compact_delete(&mut self, schema: &Schema, table: &str, id: i64) -> ApiResult<DeleteReport> {
        schema.require(table)?;
        if self.get(table, id).is_none() {
            return Err(not_found(table, id));
        }
        self.check_restrictions(schema, table, id)?;

        let mut cascaded: BTreeMap<String, usize> = BTreeMap::new();
        let relocated = self.delete_unchecked(schema, table, id, &mut cascaded);

        Ok(DeleteReport {
            table: table.to_string(),
            deleted_id: id,
            relocated,
            cascaded: cascaded
                .into_iter()
                .map(|(table, count)| CascadeSummary { table, count })
                .collect(),
        })
    }

    /// Fail if deleting `table[id]` would orphan a restricting reference,
    /// directly or through any cascade it triggers
    fn check_restrictions(&self, schema: &Schema, table: &str, id: i64) -> ApiResult<()> {
        for reference in schema.references_to(table) {
            let referencing = self.referencing_ids(reference.from_table, reference.key.field, id);
            if referencing.is_empty() {
                continue;
            }
            match reference.key.on_delete {
                OnDelete::Restrict => {
                    return Err(ConflictError::Restricted {
                        table: table.to_string(),
                        id,
                        referenced_by: reference.from_table.to_string(),
                        count: referencing.len(),
                    }
                    .into());
                }
                OnDelete::Cascade => {
                    for child in referencing {
                        self.check_restrictions(schema, reference.from_table, child)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn delete_unchecked(
        &mut self,
        schema: &Schema,
        table: &str,
        id: i64,
        cascaded: &mut BTreeMap<String, usize>,
    ) -> Option<Relocation> {
        for reference in schema.references_to(table) {
            if reference.key.on_delete != OnDelete::Cascade {
                continue;
            }
            // Descending order keeps the ids still queued for deletion valid:
            // each relocation only moves the current last row, which is
            // already gone by the time smaller ids are processed.
            let mut children = self.referencing_ids(reference.from_table, reference.key.field, id);
            children.sort_unstable_by(|a, b| b.cmp(a));
            for child in children {
                self.delete_unchecked(schema, reference.from_table, child, cascaded);
                *cascaded.entry(reference.from_table.to_string()).or_default() += 1;
            }
        }

        let last = self.table(table).and_then(TableData::last_id).unwrap_or(id);
        let relocated = if last != id {
            self.relocate(schema, table, last, id);
            Some(Relocation { from: last, to: id })
        } else {
            self.remove(table, id);
            None
        };

        self.reseed(table);
        tracing::debug!(table, id, ?relocated, "compacted table after delete");
        relocated
    }

    /// Move row `from` into slot `to` and repoint every reference
    fn relocate(&mut self, schema: &Schema, table: &str, from: i64, to: i64) {
        if let Some(mut row) = self.get(table, from).cloned() {
            if let Some(obj) = row.as_object_mut() {
                obj.insert("id".to_string(), Value::from(to));
            }
            self.put(table, to, row);
        }
        self.remove(table, from);

        for reference in schema.references_to(table) {
            for child in self.referencing_ids(reference.from_table, reference.key.field, from) {
                if let Some(mut row) = self.get(reference.from_table, child).cloned() {
                    if let Some(obj) = row.as_object_mut() {
                        obj.insert(reference.key.field.to_string(), Value::from(to));
                    }
                    self.put(reference.from_table, child, row);
                }
            }
        }
    }

    fn referencing_ids(&self, table: &str, field: &str, id: i64) -> Vec<i64> {
        self.tables
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|(_, row)| row.get(field).and_then(Value::as_i64) == Some(id))
                    .map(|(row_id, _)| *row_id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn not_found(table: &str, id: i64) -> ApiError {
    RecordError::NotFound {
        table: table.to_string(),
        id,
    }
    .into()
}

fn into_object(table: &str, row: Value) -> ApiResult<serde_json::Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(RecordError::SerializationError {
            table: table.to_string(),
            message: format!("expected a JSON object, got {}", other),
        }
        .into()),
    }
}

/// Unique-key comparison: strings trimmed and case-insensitive, others exact
fn values_collide(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            a.trim().to_lowercase() == b.trim().to_lowercase()
        }
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ForeignKey, TableSchema};
    use serde_json::json;

    const SHOPS: TableSchema = TableSchema {
        name: "shops",
        singular: "shop",
        fields: &["name"],
        date_field: None,
        foreign_keys: &[],
        unique_keys: &[&["name"]],
    };

    const CLERKS: TableSchema = TableSchema {
        name: "clerks",
        singular: "clerk",
        fields: &["shop_id"],
        date_field: None,
        foreign_keys: &[ForeignKey {
            field: "shop_id",
            table: "shops",
            on_delete: OnDelete::Restrict,
        }],
        unique_keys: &[],
    };

    const SHELVES: TableSchema = TableSchema {
        name: "shelves",
        singular: "shelf",
        fields: &["shop_id", "label"],
        date_field: None,
        foreign_keys: &[ForeignKey {
            field: "shop_id",
            table: "shops",
            on_delete: OnDelete::Cascade,
        }],
        unique_keys: &[&["shop_id", "label"]],
    };

    fn schema() -> Schema {
        Schema::new()
            .with_table(SHOPS)
            .with_table(CLERKS)
            .with_table(SHELVES)
    }

    fn ids(ws: &Workspace, table: &str) -> Vec<i64> {
        ws.table(table)
            .map(|t| t.rows.keys().copied().collect())
            .unwrap_or_default()
    }

    fn seeded() -> Workspace {
        let schema = schema();
        let mut ws = Workspace::new();
        for name in ["north", "south", "east", "west"] {
            ws.insert(&schema, "shops", json!({ "name": name })).unwrap();
        }
        ws
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let ws = seeded();
        assert_eq!(ids(&ws, "shops"), vec![1, 2, 3, 4]);
        assert_eq!(ws.get("shops", 3).unwrap()["name"], "east");
        assert_eq!(ws.table("shops").unwrap().next_id, 5);
    }

    #[test]
    fn test_insert_rejects_missing_foreign_key() {
        let schema = schema();
        let mut ws = seeded();
        let err = ws
            .insert(&schema, "clerks", json!({ "shop_id": 99 }))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("shop_id"));
    }

    #[test]
    fn test_unique_key_is_case_insensitive() {
        let schema = schema();
        let mut ws = seeded();
        let err = ws
            .insert(&schema, "shops", json!({ "name": "  NORTH " }))
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_RECORD");
    }

    #[test]
    fn test_update_may_keep_its_own_unique_value() {
        let schema = schema();
        let mut ws = seeded();
        let updated = ws
            .update(&schema, "shops", 1, json!({ "name": "North", "id": 42 }))
            .unwrap();
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["name"], "North");
    }

    #[test]
    fn test_delete_last_row_just_removes_it() {
        let schema = schema();
        let mut ws = seeded();
        let report = ws.compact_delete(&schema, "shops", 4).unwrap();
        assert_eq!(report.relocated, None);
        assert_eq!(ids(&ws, "shops"), vec![1, 2, 3]);
        assert_eq!(ws.table("shops").unwrap().next_id, 4);
    }

    #[test]
    fn test_delete_moves_last_row_into_slot() {
        let schema = schema();
        let mut ws = seeded();
        let report = ws.compact_delete(&schema, "shops", 2).unwrap();
        assert_eq!(report.relocated, Some(Relocation { from: 4, to: 2 }));
        assert_eq!(ids(&ws, "shops"), vec![1, 2, 3]);
        assert_eq!(ws.get("shops", 2).unwrap()["name"], "west");
        assert_eq!(ws.get("shops", 2).unwrap()["id"], 2);

        let next = ws.insert(&schema, "shops", json!({ "name": "central" })).unwrap();
        assert_eq!(next["id"], 4);
    }

    #[test]
    fn test_delete_relocates_foreign_keys() {
        let schema = schema();
        let mut ws = seeded();
        ws.insert(&schema, "clerks", json!({ "shop_id": 4 })).unwrap();
        ws.insert(&schema, "shelves", json!({ "shop_id": 4, "label": "A" }))
            .unwrap();

        ws.compact_delete(&schema, "shops", 1).unwrap();

        assert_eq!(ws.get("clerks", 1).unwrap()["shop_id"], 1);
        assert_eq!(ws.get("shelves", 1).unwrap()["shop_id"], 1);
        assert_eq!(ws.get("shops", 1).unwrap()["name"], "west");
    }

    #[test]
    fn test_restricted_delete_leaves_workspace_untouched() {
        let schema = schema();
        let mut ws = seeded();
        ws.insert(&schema, "clerks", json!({ "shop_id": 2 })).unwrap();
        ws.insert(&schema, "shelves", json!({ "shop_id": 2, "label": "A" }))
            .unwrap();
        ws.take_journal();

        let err = ws.compact_delete(&schema, "shops", 2).unwrap_err();
        assert_eq!(err.error_code(), "DELETE_RESTRICTED");
        assert!(ws.take_journal().is_empty());
        assert_eq!(ids(&ws, "shelves"), vec![1]);
    }

    #[test]
    fn test_cascade_deletes_children_and_keeps_them_contiguous() {
        let schema = schema();
        let mut ws = seeded();
        for (shop, label) in [(1, "A"), (2, "A"), (1, "B"), (3, "A"), (1, "C")] {
            ws.insert(&schema, "shelves", json!({ "shop_id": shop, "label": label }))
                .unwrap();
        }

        let report = ws.compact_delete(&schema, "shops", 1).unwrap();

        assert_eq!(
            report.cascaded,
            vec![CascadeSummary {
                table: "shelves".to_string(),
                count: 3
            }]
        );
        assert_eq!(ids(&ws, "shelves"), vec![1, 2]);
        let mut remaining: Vec<(i64, String)> = ws
            .rows("shelves")
            .iter()
            .map(|r| (r["shop_id"].as_i64().unwrap(), r["label"].as_str().unwrap().to_string()))
            .collect();
        remaining.sort();
        // shop 4 ("west") moved into slot 1; shops 2 and 3 keep their ids
        assert_eq!(remaining, vec![(2, "A".to_string()), (3, "A".to_string())]);
        assert_eq!(ws.get("shops", 1).unwrap()["name"], "west");
    }

    #[test]
    fn test_journal_records_relocation() {
        let schema = schema();
        let mut ws = seeded();
        ws.take_journal();

        ws.compact_delete(&schema, "shops", 3).unwrap();
        let journal = ws.take_journal();

        assert!(journal.contains(&Change::Remove {
            table: "shops".to_string(),
            id: 4
        }));
        assert!(journal.contains(&Change::Reseed {
            table: "shops".to_string(),
            next_id: 4
        }));
        assert!(journal.iter().any(|c| matches!(
            c,
            Change::Put { table, id: 3, row } if table == "shops" && row["name"] == "west"
        )));
    }

    #[test]
    fn test_delete_missing_row_is_not_found() {
        let schema = schema();
        let mut ws = seeded();
        let err = ws.compact_delete(&schema, "shops", 10).unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }
}
