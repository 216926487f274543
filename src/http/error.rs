//! HTTP error handling and response types.
//!
//! Responses intentionally never carry partition/schema names or raw storage
//! messages; tenants must not learn anything about each other's layout from
//! an error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::scheduler::SchedulingError;
use crate::tenancy::TenantError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// No tenant could be resolved for the request
    MissingTenant,
    /// A tenant token was presented but did not verify
    InvalidToken,
    /// A conflicting lifecycle operation is already running
    ProvisionConflict,
    /// Backing storage unreachable or failing
    StorageUnavailable,
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::MissingTenant => (
                StatusCode::BAD_REQUEST,
                ApiError::new("MISSING_TENANT", "No tenant identified for this request"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("INVALID_TOKEN", "Tenant token did not verify"),
            ),
            AppError::ProvisionConflict => (
                StatusCode::CONFLICT,
                ApiError::new(
                    "PROVISION_CONFLICT",
                    "A lifecycle operation for this tenant is already in progress",
                ),
            ),
            AppError::StorageUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("STORAGE_UNAVAILABLE", "Storage temporarily unavailable"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::MissingTenant => AppError::MissingTenant,
            SchedulingError::InvalidToken => AppError::InvalidToken,
            SchedulingError::StorageUnavailable(_) => AppError::StorageUnavailable,
        }
    }
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::MissingTenant => AppError::MissingTenant,
            TenantError::InvalidToken => AppError::InvalidToken,
            TenantError::ProvisionConflict { .. } => AppError::ProvisionConflict,
            TenantError::UnknownTenant { .. } => {
                AppError::NotFound("Tenant not registered".to_string())
            }
            TenantError::CorruptPartitionName { .. } | TenantError::Storage(_) => {
                AppError::StorageUnavailable
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => {
                AppError::NotFound("Resource not found".to_string())
            }
            RepositoryError::ValidationError { message, .. } => AppError::BadRequest(message),
            _ => AppError::StorageUnavailable,
        }
    }
}
