//! # Restaurant Operations API
//!
//! A REST API over a restaurant chain's operational data: locations,
//! positions, employees, menus, dishes, suppliers, supply categories and
//! the link tables between them.
//!
//! ## Features
//!
//! - **Uniform CRUD**: every table is served by the same generic handlers
//! - **Query language**: `page`, `limit`, `filter`, `sort`, `from`/`to` on every list
//! - **Compact deletion**: ids stay contiguous; the last row moves into a freed slot
//! - **Relations**: navigation routes declared in YAML (`/menus/1/dishes`)
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restaurant::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryStore::new(RestaurantModule.schema()))
//!     .register_module(RestaurantModule)?
//!     .build()?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod links;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::{Record, Validate},
        error::{ApiError, ApiResult},
        field::{FieldFormat, FieldValue},
        module::Module,
        query::{PaginatedResponse, PaginationConfig, QueryParams, RecordQuery},
        schema::{ForeignKey, OnDelete, Schema, TableSchema},
        service::{RecordStore, Repository},
        tables::DeleteReport,
        validation::{RecordValidationConfig, Validated},
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Tables ===
    pub use crate::entities::{
        Dish, DishRequirement, Employee, Location, LocationMenu, LocationStock, Menu, MenuDish,
        Position, RestaurantModule, SeedData, Supplier, SupplierCategory, SupplyCategory,
    };

    // === Relations ===
    pub use crate::links::{AppState, RelationDirection, RelationRegistry, RouteInfo};

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::{AppConfig, RelationDefinition, RelationVia, RelationsConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, TableRegistry};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
