//! In-memory record store for development and tests

use crate::core::error::{ApiError, ApiResult, StorageError};
use crate::core::schema::Schema;
use crate::core::service::RecordStore;
use crate::core::tables::{DeleteReport, Workspace};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// In-memory store holding every table in one [`Workspace`]
///
/// A single lock guards the workspace, so every write (including a
/// cascading delete) is atomic with respect to readers.
#[derive(Clone)]
pub struct InMemoryStore {
    schema: Arc<Schema>,
    workspace: Arc<RwLock<Workspace>>,
}

impl InMemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
            workspace: Arc::new(RwLock::new(Workspace::new())),
        }
    }

    fn write<R>(&self, op: impl FnOnce(&mut Workspace, &Schema) -> ApiResult<R>) -> ApiResult<R> {
        let mut workspace = self.workspace.write().map_err(|e| {
            ApiError::from(StorageError::LockPoisoned {
                message: format!("Failed to acquire write lock: {}", e),
            })
        })?;
        let result = op(&mut workspace, &self.schema);
        // Nothing replays the journal here
        workspace.take_journal();
        result
    }

    fn read<R>(&self, op: impl FnOnce(&Workspace) -> R) -> ApiResult<R> {
        let workspace = self.workspace.read().map_err(|e| {
            ApiError::from(StorageError::LockPoisoned {
                message: format!("Failed to acquire read lock: {}", e),
            })
        })?;
        Ok(op(&workspace))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn insert(&self, table: &str, row: Value) -> ApiResult<Value> {
        let row = self.write(|ws, schema| ws.insert(schema, table, row))?;
        tracing::debug!(table, id = ?row.get("id"), "inserted row");
        Ok(row)
    }

    async fn get(&self, table: &str, id: i64) -> ApiResult<Option<Value>> {
        self.schema.require(table)?;
        self.read(|ws| ws.get(table, id).cloned())
    }

    async fn list(&self, table: &str) -> ApiResult<Vec<Value>> {
        self.schema.require(table)?;
        self.read(|ws| ws.rows(table))
    }

    async fn update(&self, table: &str, id: i64, row: Value) -> ApiResult<Value> {
        let row = self.write(|ws, schema| ws.update(schema, table, id, row))?;
        tracing::debug!(table, id, "updated row");
        Ok(row)
    }

    async fn delete(&self, table: &str, id: i64) -> ApiResult<DeleteReport> {
        let report = self.write(|ws, schema| ws.compact_delete(schema, table, id))?;
        tracing::info!(
            table,
            id,
            relocated = ?report.relocated,
            cascaded = report.cascaded.len(),
            "deleted row"
        );
        Ok(report)
    }
}
