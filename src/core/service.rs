//! Store trait and typed repositories
//!
//! A [`RecordStore`] holds every table as JSON rows. It is agnostic to the
//! record types; [`Repository`] adds the typed view used by handlers.

use crate::core::entity::Record;
use crate::core::error::{ApiResult, RecordError};
use crate::core::query::RecordQuery;
use crate::core::schema::Schema;
use crate::core::tables::DeleteReport;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Storage backend for every table of a schema
///
/// Rows cross this boundary as JSON objects carrying an integer `id`.
/// Implementations enforce foreign keys, unique keys and compact deletion.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Schema of the tables served by this store
    fn schema(&self) -> &Schema;

    /// Insert a row, assigning the next id of the table
    async fn insert(&self, table: &str, row: Value) -> ApiResult<Value>;

    /// Get a row by id
    async fn get(&self, table: &str, id: i64) -> ApiResult<Option<Value>>;

    /// All rows of a table in id order
    async fn list(&self, table: &str) -> ApiResult<Vec<Value>>;

    /// Replace a row, keeping its id
    async fn update(&self, table: &str, id: i64, row: Value) -> ApiResult<Value>;

    /// Compact-delete a row, cascading and relocating as needed
    async fn delete(&self, table: &str, id: i64) -> ApiResult<DeleteReport>;

    /// Run a list query, returning the page and the total match count
    async fn query(&self, table: &str, query: &RecordQuery) -> ApiResult<(Vec<Value>, usize)> {
        let rows = self.list(table).await?;
        Ok(query.apply(rows))
    }
}

/// Typed access to one table of a [`RecordStore`]
pub struct Repository<T: Record> {
    store: Arc<dyn RecordStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn create(&self, record: T) -> ApiResult<T> {
        let row = self.store.insert(T::table_name(), to_row(&record)?).await?;
        from_row(row)
    }

    /// Get a row or fail with `RECORD_NOT_FOUND`
    pub async fn get(&self, id: i64) -> ApiResult<T> {
        self.find(id).await?.ok_or_else(|| {
            RecordError::NotFound {
                table: T::table_name().to_string(),
                id,
            }
            .into()
        })
    }

    pub async fn find(&self, id: i64) -> ApiResult<Option<T>> {
        self.store
            .get(T::table_name(), id)
            .await?
            .map(from_row)
            .transpose()
    }

    pub async fn query(&self, query: &RecordQuery) -> ApiResult<(Vec<T>, usize)> {
        let (rows, total) = self.store.query(T::table_name(), query).await?;
        let records = rows.into_iter().map(from_row).collect::<ApiResult<Vec<T>>>()?;
        Ok((records, total))
    }

    pub async fn update(&self, id: i64, mut record: T) -> ApiResult<T> {
        record.set_id(id);
        let row = self
            .store
            .update(T::table_name(), id, to_row(&record)?)
            .await?;
        from_row(row)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<DeleteReport> {
        self.store.delete(T::table_name(), id).await
    }
}

fn to_row<T: Record>(record: &T) -> ApiResult<Value> {
    serde_json::to_value(record).map_err(|e| {
        RecordError::SerializationError {
            table: T::table_name().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

fn from_row<T: Record>(row: Value) -> ApiResult<T> {
    serde_json::from_value(row).map_err(|e| {
        RecordError::SerializationError {
            table: T::table_name().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
