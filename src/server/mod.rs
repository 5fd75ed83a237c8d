//! Server module for building HTTP servers with auto-registered routes
//!
//! The `ServerBuilder` registers:
//! - CRUD routes for every table declared in modules
//! - Relation routes between tables
//! - Health and route introspection endpoints

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use entity_registry::{RecordDescriptor, TableDescriptor, TableRegistry};
pub use host::ServerHost;
