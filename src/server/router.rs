//! Router builder utilities for relation routes

use crate::links::handlers::{AppState, list_available_routes, list_related};
use axum::{Router, routing::get};

/// Build relation routes
///
/// These routes are generic and work for all tables:
/// - GET /{table}/{id}/links - List available relation routes
/// - GET /{table}/{id}/{route} - List related rows
pub fn build_relation_routes() -> Router<AppState> {
    Router::new()
        .route("/{table}/{id}/links", get(list_available_routes))
        .route("/{table}/{id}/{route}", get(list_related))
}
