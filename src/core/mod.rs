//! Core module containing the record model, the query language and the
//! shared write logic

pub mod entity;
pub mod error;
pub mod field;
pub mod module;
pub mod query;
pub mod schema;
pub mod service;
pub mod tables;
pub mod validation;

pub use entity::{Record, Validate};
pub use error::{ApiError, ApiResult};
pub use field::{FieldFormat, FieldValue};
pub use module::Module;
pub use query::{PaginatedResponse, PaginationConfig, QueryParams, RecordQuery};
pub use schema::{ForeignKey, OnDelete, Schema, TableSchema};
pub use service::{RecordStore, Repository};
pub use tables::{DeleteReport, Workspace};
