//! Relation navigation
//!
//! Relations are declared in YAML and resolved at request time against the
//! record store, independently of the record types.

pub mod handlers;
pub mod registry;
pub mod service;

pub use handlers::{AppState, list_available_routes, list_related};
pub use registry::{RelationDirection, RelationRegistry, RouteInfo};
pub use service::{RelatedRow, related_rows};
