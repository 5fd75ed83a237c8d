//! HTTP handlers for relation navigation
//!
//! These handlers are generic over tables: the registry maps
//! `/{table}/{id}/{route}` to a relation and a direction.

use crate::core::error::ApiResult;
use crate::core::query::PaginationConfig;
use crate::core::service::RecordStore;
use crate::links::registry::{RelationDirection, RelationRegistry, RouteInfo};
use crate::links::service::{RelatedRow, related_rows, related_table};
use crate::server::handlers::parse_id;
use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use std::sync::Arc;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub registry: Arc<RelationRegistry>,
    pub pagination: PaginationConfig,
}

/// Response for listing related rows
#[derive(Debug, Serialize)]
pub struct RelatedRowsResponse {
    pub table: String,
    pub id: i64,
    pub route: String,
    pub relation: String,
    pub direction: RelationDirection,
    pub related_table: String,
    pub data: Vec<RelatedRow>,
    pub count: usize,
}

/// List rows related to a row through a named route
///
/// GET /{table}/{id}/{route}
///
/// Examples:
/// - GET /menus/1/dishes (dishes on menu 1, with the menu_dishes row)
/// - GET /employees/4/location (the location employee 4 works at)
pub async fn list_related(
    State(state): State<AppState>,
    Path((table, id, route)): Path<(String, String, String)>,
) -> ApiResult<Json<RelatedRowsResponse>> {
    state.store.schema().require(&table)?;
    let id = parse_id(&id)?;
    let (relation, direction) = state.registry.resolve_route(&table, &route)?;

    let data = related_rows(state.store.as_ref(), relation, direction, id).await?;

    Ok(Json(RelatedRowsResponse {
        related_table: related_table(relation, direction).to_string(),
        relation: relation.name.clone(),
        count: data.len(),
        table,
        id,
        route,
        direction,
        data,
    }))
}

/// Response for route introspection
#[derive(Debug, Serialize)]
pub struct IntrospectionResponse {
    pub table: String,
    pub id: i64,
    pub available_routes: Vec<RouteDescription>,
}

/// Description of an available route
#[derive(Debug, Serialize)]
pub struct RouteDescription {
    pub path: String,
    pub method: String,
    #[serde(flatten)]
    pub info: RouteInfo,
}

/// List the relation routes available from a row
///
/// GET /{table}/{id}/links
pub async fn list_available_routes(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<IntrospectionResponse>> {
    state.store.schema().require(&table)?;
    let id = parse_id(&id)?;

    let available_routes = state
        .registry
        .list_routes_for_table(&table)
        .into_iter()
        .map(|info| RouteDescription {
            path: format!("/{}/{}/{}", table, id, info.route_name),
            method: "GET".to_string(),
            info,
        })
        .collect();

    Ok(Json(IntrospectionResponse {
        table,
        id,
        available_routes,
    }))
}
