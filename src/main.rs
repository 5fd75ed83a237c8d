//! Restaurant operations API server

use anyhow::{Context, Result};
use clap::Parser;
use restaurant::config::{AppConfig, logging};
use restaurant::core::{Module, RecordStore};
use restaurant::entities::{RestaurantModule, SeedData};
use restaurant::server::ServerBuilder;
use restaurant::storage;
use std::path::PathBuf;

/// REST API for a restaurant chain's locations, staff, menus and supplies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "RESTAURANT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long, env = "RESTAURANT_PORT")]
    port: Option<u16>,

    /// YAML dataset inserted at startup, overriding the configuration
    #[arg(long, env = "RESTAURANT_SEED")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(seed) = &args.seed {
        config.storage.seed = Some(seed.display().to_string());
    }
    config.validate()?;

    logging::init(&config.logging)?;

    let module = RestaurantModule;
    let store = storage::connect(&config.storage, module.schema()).await?;

    if let Some(path) = &config.storage.seed {
        if is_empty(store.as_ref()).await? {
            let seed = SeedData::from_yaml_file(path)?;
            seed.apply(store.as_ref(), &module.table_registry())
                .await
                .with_context(|| format!("loading seed data from {}", path))?;
        } else {
            tracing::info!(path = %path, "store already holds rows, skipping seed data");
        }
    }

    let addr = config.bind_address();
    ServerBuilder::new()
        .with_shared_store(store)
        .with_pagination(config.pagination)
        .with_cors(config.server.cors)
        .with_service_name(config.server.service_name.clone())
        .register_module(module)?
        .serve(&addr)
        .await
}

async fn is_empty(store: &dyn RecordStore) -> Result<bool> {
    for table in store.schema().tables() {
        if !store.list(table.name).await?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
