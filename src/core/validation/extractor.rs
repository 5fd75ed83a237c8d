//! Axum extractor for validated rows
//!
//! `Validated<T>` parses the JSON body, applies the table's filters and
//! validators, then deserializes the result into the typed row.

use crate::core::entity::Record;
use crate::core::error::{ApiError, RequestError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::Method,
};
use serde_json::Value;

/// Axum extractor yielding a filtered and validated row
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_dish(
///     Validated(dish): Validated<Dish>,
/// ) -> ApiResult<Json<Dish>> {
///     // dish is already trimmed, rounded and validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

/// Validation operation matching an HTTP method
pub fn operation_for(method: &Method) -> &'static str {
    match *method {
        Method::PUT | Method::PATCH => "update",
        _ => "create",
    }
}

/// Run the validation pipeline on a raw payload
pub fn validate_payload<T: Record>(operation: &str, payload: Value) -> Result<T, ApiError> {
    if !payload.is_object() {
        return Err(RequestError::InvalidBody {
            message: "expected a JSON object".to_string(),
        }
        .into());
    }

    let config = T::validation_config(operation);
    let mut payload = config
        .validate_and_filter(payload)
        .map_err(ValidationError::FieldErrors)?;

    // Ids are assigned by the store, never by the client
    if let Some(object) = payload.as_object_mut() {
        object.remove("id");
    }

    let row: T = serde_json::from_value(payload).map_err(|e| RequestError::InvalidBody {
        message: e.to_string(),
    })?;

    let errors = row.check();
    if !errors.is_empty() {
        return Err(ValidationError::FieldErrors(errors).into());
    }

    Ok(row)
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Record,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = operation_for(req.method());

        let Json(payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e| ValidationError::InvalidJson {
                message: e.body_text(),
            })?;

        validate_payload::<T>(operation, payload).map(Validated)
    }
}
