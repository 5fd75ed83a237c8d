//! Generic CRUD handlers shared by every table

use crate::core::entity::Record;
use crate::core::error::{ApiError, ApiResult, QueryError, RequestError};
use crate::core::query::{PaginatedResponse, QueryParams};
use crate::core::service::Repository;
use crate::core::tables::DeleteReport;
use crate::core::validation::Validated;
use crate::links::handlers::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;

/// Parse a path id; only positive integers name a row
pub fn parse_id(raw: &str) -> ApiResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RequestError::InvalidId {
            id: raw.to_string(),
        }
        .into()),
    }
}

/// Row id from the `{id}` path segment
///
/// Extracted from the request parts, so a bad id is rejected with
/// `INVALID_ID` before the body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RequestError::InvalidId { id: e.body_text() })?;
        parse_id(&raw).map(RecordId)
    }
}

/// GET /{table}
pub async fn list_records<T: Record>(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<T>>> {
    let Query(params) = params.map_err(|e| QueryError::InvalidParameter {
        name: "query".to_string(),
        value: e.body_text(),
    })?;
    let query = params.compile(&T::schema(), &state.pagination)?;

    let (data, total) = Repository::<T>::new(state.store.clone())
        .query(&query)
        .await?;
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// GET /{table}/{id}
pub async fn get_record<T: Record>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<T>> {
    let record = Repository::<T>::new(state.store.clone()).get(id).await?;
    Ok(Json(record))
}

/// POST /{table}
pub async fn create_record<T: Record>(
    State(state): State<AppState>,
    Validated(record): Validated<T>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let created = Repository::<T>::new(state.store.clone())
        .create(record)
        .await?;
    tracing::info!(table = T::table_name(), id = created.id(), "created row");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /{table}/{id}
pub async fn update_record<T: Record>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Validated(record): Validated<T>,
) -> ApiResult<Json<T>> {
    let updated = Repository::<T>::new(state.store.clone())
        .update(id, record)
        .await?;
    Ok(Json(updated))
}

/// DELETE /{table}/{id}
pub async fn delete_record<T: Record>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<DeleteReport>> {
    let report = Repository::<T>::new(state.store.clone()).delete(id).await?;
    Ok(Json(report))
}
