//! Typed error handling for the restaurant API
//!
//! Every failure a handler can produce is an [`ApiError`]. Each category maps
//! to an HTTP status and a stable machine-readable code so clients can react
//! to specific cases instead of parsing messages.
//!
//! # Error Categories
//!
//! - [`RecordError`]: missing rows, unknown tables, (de)serialization failures
//! - [`ValidationError`]: field-level validation of request payloads
//! - [`QueryError`]: malformed list queries (filter, sort, date range)
//! - [`ConflictError`]: unique-key violations and restricted deletions
//! - [`RequestError`]: malformed paths and unknown relation routes
//! - [`StorageError`]: backend failures
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! async fn get_dish(repo: &Repository<Dish>, id: i64) -> ApiResult<Dish> {
//!     repo.find(id).await?.ok_or(ApiError::Record(RecordError::NotFound {
//!         table: "dishes".to_string(),
//!         id,
//!     }))
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type of the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Record(e) => e.status_code(),
            ApiError::Validation(e) => e.status_code(),
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Request(e) => e.status_code(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Record(e) => e.error_code(),
            ApiError::Validation(e) => e.error_code(),
            ApiError::Query(_) => "INVALID_QUERY",
            ApiError::Conflict(e) => e.error_code(),
            ApiError::Request(e) => e.error_code(),
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Record(RecordError::NotFound { table, id }) => Some(serde_json::json!({
                "table": table,
                "id": id
            })),
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ApiError::Conflict(ConflictError::Duplicate { table, fields }) => {
                Some(serde_json::json!({ "table": table, "fields": fields }))
            }
            ApiError::Conflict(ConflictError::Restricted {
                table,
                id,
                referenced_by,
                count,
            }) => Some(serde_json::json!({
                "table": table,
                "id": id,
                "referenced_by": referenced_by,
                "count": count
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to individual rows
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{table} row with id {id} not found")]
    NotFound { table: String, id: i64 },

    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    #[error("Failed to serialize/deserialize {table} row: {message}")]
    SerializationError { table: String, message: String },
}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::UnknownTable { .. } => StatusCode::NOT_FOUND,
            RecordError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::NotFound { .. } => "RECORD_NOT_FOUND",
            RecordError::UnknownTable { .. } => "UNKNOWN_TABLE",
            RecordError::SerializationError { .. } => "RECORD_SERIALIZATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to payload validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            _ => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors in list query parameters
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Invalid value '{value}' for query parameter '{name}'")]
    InvalidParameter { name: String, value: String },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Unknown field '{field}' for table '{table}'")]
    UnknownField { table: String, field: String },

    #[error("Invalid sort expression '{value}'")]
    InvalidSort { value: String },

    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidRange { from: String, to: String },

    #[error("Table '{table}' has no date column to range over")]
    NoDateColumn { table: String },
}

// =============================================================================
// Conflict Errors
// =============================================================================

/// Errors caused by the current state of the data
#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("A {table} row with the same {} already exists", .fields.join(", "))]
    Duplicate { table: String, fields: Vec<String> },

    #[error("Cannot delete {table} row {id}: referenced by {count} {referenced_by} row(s)")]
    Restricted {
        table: String,
        id: i64,
        referenced_by: String,
        count: usize,
    },
}

impl ConflictError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConflictError::Duplicate { .. } => "DUPLICATE_RECORD",
            ConflictError::Restricted { .. } => "DELETE_RESTRICTED",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid id '{id}': expected a positive integer")]
    InvalidId { id: String },

    #[error("Route '{route}' not found for table '{table}'")]
    RouteNotFound { table: String, route: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidId { .. } => "INVALID_ID",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    #[error("Store lock poisoned: {message}")]
    LockPoisoned { message: String },

    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ApiError {
    fn from(err: serde_yaml::Error) -> Self {
        ApiError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Storage(StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: err.to_string(),
        })
    }
}

/// A specialized Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_display() {
        let err = RecordError::NotFound {
            table: "dishes".to_string(),
            id: 7,
        };
        assert!(err.to_string().contains("dishes"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_record_error_status_code() {
        let err = ApiError::from(RecordError::NotFound {
            table: "dishes".to_string(),
            id: 7,
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError::new("name", "is required"),
            FieldValidationError::new("price", "must be positive"),
        ]);
        let display = err.to_string();
        assert!(display.contains("name"));
        assert!(display.contains("price"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflict_errors_map_to_409() {
        let err = ApiError::from(ConflictError::Restricted {
            table: "positions".to_string(),
            id: 2,
            referenced_by: "employees".to_string(),
            count: 3,
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "DELETE_RESTRICTED");

        let response = err.to_response();
        let details = response.details.expect("restricted errors carry details");
        assert_eq!(details["referenced_by"], "employees");
        assert_eq!(details["count"], 3);
    }

    #[test]
    fn test_duplicate_message_lists_fields() {
        let err = ConflictError::Duplicate {
            table: "menu_dishes".to_string(),
            fields: vec!["menu_id".to_string(), "dish_id".to_string()],
        };
        assert!(err.to_string().contains("menu_id, dish_id"));
    }

    #[test]
    fn test_query_error_is_bad_request() {
        let err = ApiError::from(QueryError::InvalidSort {
            value: "name:sideways".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_QUERY");
    }

    #[test]
    fn test_config_parse_error_mentions_file() {
        let err = ConfigError::ParseError {
            file: Some("app.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("app.yaml"));

        let err = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse config: bad indent");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let api_err: ApiError = json_err.into();
        assert!(matches!(
            api_err,
            ApiError::Validation(ValidationError::InvalidJson { .. })
        ));
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_api_error() {
        let original = ApiError::from(RequestError::InvalidId {
            id: "abc".to_string(),
        });
        let wrapped = anyhow::Error::new(original);
        let back: ApiError = wrapped.into();
        assert_eq!(back.error_code(), "INVALID_ID");
    }
}
