//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresStore`, a [`RecordStore`] backed by a PostgreSQL
//! database via `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! restaurant-ops = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Rows of every table live in a shared `records` table keyed by
//! `(table_name, id)` with a JSONB `data` column. Identity counters live
//! in an `identities` table.
//!
//! # Writes
//!
//! Each write runs in one transaction holding an exclusive lock on both
//! tables: the involved tables are loaded into a [`Workspace`], the shared
//! integrity and compaction logic runs there, and the resulting journal is
//! replayed before commit. A failed check rolls the transaction back.

use crate::core::error::{ApiError, ApiResult, StorageError};
use crate::core::schema::Schema;
use crate::core::service::RecordStore;
use crate::core::tables::{Change, DeleteReport, TableData, Workspace};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// This creates:
/// - `records` table holding every row as JSONB
/// - `identities` table holding the next id of each table
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS records (
            table_name TEXT NOT NULL,
            id BIGINT NOT NULL,
            data JSONB NOT NULL,
            PRIMARY KEY (table_name, id)
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create records table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS identities (
            table_name TEXT NOT NULL PRIMARY KEY,
            next_id BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create identities table: {}", e))?;

    Ok(())
}

fn db_error(err: sqlx::Error) -> ApiError {
    StorageError::QueryError {
        backend: "postgres".to_string(),
        message: err.to_string(),
    }
    .into()
}

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Record store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let store = PostgresStore::connect(&url, 5, RestaurantModule.schema()).await?;
/// let row = store.insert("dishes", json!({"name": "Borscht", ...})).await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
    schema: Arc<Schema>,
}

impl PostgresStore {
    pub fn new(pool: PgPool, schema: Schema) -> Self {
        Self {
            pool,
            schema: Arc::new(schema),
        }
    }

    /// Open a pool and make sure the storage tables exist
    pub async fn connect(url: &str, max_connections: u32, schema: Schema) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;
        ensure_schema(&pool).await?;
        Ok(Self::new(pool, schema))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Tables an insert or update on `table` reads
    fn row_tables(&self, table: &str) -> ApiResult<Vec<String>> {
        let table_schema = self.schema.require(table)?;
        let mut tables = vec![table.to_string()];
        tables.extend(table_schema.foreign_keys.iter().map(|fk| fk.table.to_string()));
        tables.sort();
        tables.dedup();
        Ok(tables)
    }

    /// Run a workspace operation inside a locked transaction
    async fn write<R: Send>(
        &self,
        tables: Vec<String>,
        op: impl FnOnce(&mut Workspace, &Schema) -> ApiResult<R> + Send,
    ) -> ApiResult<R> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query("LOCK TABLE records, identities IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let mut workspace = load_workspace(&mut tx, &tables).await?;
        // Dropping the transaction on error rolls it back
        let result = op(&mut workspace, &self.schema)?;

        let changes = workspace.take_journal();
        let count = changes.len();
        for change in changes {
            apply_change(&mut tx, change).await?;
        }
        tx.commit().await.map_err(|e| {
            ApiError::from(StorageError::TransactionError {
                message: e.to_string(),
            })
        })?;

        tracing::trace!(changes = count, "committed journal");
        Ok(result)
    }
}

async fn load_workspace(conn: &mut PgConnection, tables: &[String]) -> ApiResult<Workspace> {
    let rows = sqlx::query_as::<_, (String, i64, Value)>(
        "SELECT table_name, id, data FROM records WHERE table_name = ANY($1)",
    )
    .bind(tables)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    let identities = sqlx::query_as::<_, (String, i64)>(
        "SELECT table_name, next_id FROM identities WHERE table_name = ANY($1)",
    )
    .bind(tables)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)?;

    let mut data: HashMap<String, TableData> = tables
        .iter()
        .map(|name| (name.clone(), TableData::default()))
        .collect();
    for (table, id, row) in rows {
        data.entry(table).or_default().rows.insert(id, row);
    }
    for (table, next_id) in identities {
        data.entry(table).or_default().next_id = next_id;
    }

    Ok(Workspace::from_tables(data))
}

async fn apply_change(conn: &mut PgConnection, change: Change) -> ApiResult<()> {
    match change {
        Change::Put { table, id, row } => {
            sqlx::query(
                "INSERT INTO records (table_name, id, data) VALUES ($1, $2, $3) \
                 ON CONFLICT (table_name, id) DO UPDATE SET data = EXCLUDED.data",
            )
            .bind(table)
            .bind(id)
            .bind(row)
            .execute(&mut *conn)
            .await
            .map_err(db_error)?;
        }
        Change::Remove { table, id } => {
            sqlx::query("DELETE FROM records WHERE table_name = $1 AND id = $2")
                .bind(table)
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(db_error)?;
        }
        Change::Reseed { table, next_id } => {
            sqlx::query(
                "INSERT INTO identities (table_name, next_id) VALUES ($1, $2) \
                 ON CONFLICT (table_name) DO UPDATE SET next_id = EXCLUDED.next_id",
            )
            .bind(table)
            .bind(next_id)
            .execute(&mut *conn)
            .await
            .map_err(db_error)?;
        }
    }
    Ok(())
}

#[async_trait]
impl RecordStore for PostgresStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn insert(&self, table: &str, row: Value) -> ApiResult<Value> {
        let tables = self.row_tables(table)?;
        let row = self
            .write(tables, |ws, schema| ws.insert(schema, table, row))
            .await?;
        tracing::debug!(table, id = ?row.get("id"), "inserted row");
        Ok(row)
    }

    async fn get(&self, table: &str, id: i64) -> ApiResult<Option<Value>> {
        self.schema.require(table)?;
        let row = sqlx::query_as::<_, (Value,)>(
            "SELECT data FROM records WHERE table_name = $1 AND id = $2",
        )
        .bind(table)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(|(data,)| data))
    }

    async fn list(&self, table: &str) -> ApiResult<Vec<Value>> {
        self.schema.require(table)?;
        let rows = sqlx::query_as::<_, (Value,)>(
            "SELECT data FROM records WHERE table_name = $1 ORDER BY id",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(|(data,)| data).collect())
    }

    async fn update(&self, table: &str, id: i64, row: Value) -> ApiResult<Value> {
        let tables = self.row_tables(table)?;
        let row = self
            .write(tables, |ws, schema| ws.update(schema, table, id, row))
            .await?;
        tracing::debug!(table, id, "updated row");
        Ok(row)
    }

    async fn delete(&self, table: &str, id: i64) -> ApiResult<DeleteReport> {
        self.schema.require(table)?;
        let tables = self.schema.involved_tables(table);
        let report = self
            .write(tables, |ws, schema| ws.compact_delete(schema, table, id))
            .await?;
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
