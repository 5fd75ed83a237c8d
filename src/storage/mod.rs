//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::core::schema::Schema;
use crate::core::service::RecordStore;
use anyhow::Result;
use std::sync::Arc;

/// Open the store selected by the configuration
pub async fn connect(config: &StorageConfig, schema: Schema) -> Result<Arc<dyn RecordStore>> {
    match config.backend {
        StorageBackend::InMemory => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(InMemoryStore::new(schema)))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("storage.url is required for postgres"))?;
            let store = PostgresStore::connect(url, config.max_connections, schema).await?;
            tracing::info!(max_connections = config.max_connections, "using PostgreSQL storage");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => Err(anyhow::anyhow!(
            "the postgres backend requires building with the `postgres` feature"
        )),
    }
}
