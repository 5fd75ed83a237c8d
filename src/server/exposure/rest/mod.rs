//! REST API exposure
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.

use super::super::host::ServerHost;
use crate::server::router::build_relation_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// The router serves:
    /// - Health check routes
    /// - Table CRUD routes
    /// - Relation routes
    /// - Custom routes
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let state = host.app_state();

        let table_routes = host
            .table_registry
            .build_routes()
            .merge(build_relation_routes())
            .with_state(state);

        let mut app = Self::health_routes(&host.service_name).merge(table_routes);
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes(service_name: &str) -> Router {
        let body = json!({
            "status": "ok",
            "service": service_name,
        });
        let health_check = move || {
            let body = body.clone();
            async move { Json::<Value>(body) }
        };

        Router::new()
            .route("/health", get(health_check.clone()))
            .route("/healthz", get(health_check))
    }
}
