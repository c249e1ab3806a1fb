//! Error translation for the HTTP surface
//!
//! Operation-level errors (`CreateLogError`, `GetLogError`, ...) convert into [`AppError`],
//! and `AppError` is the only type that renders an error body. Every failure reaches the
//! client as the same envelope:
//!
//! ```json
//! { "error_code": "document/document-not-found", "error_message": "Document with '...' not found." }
//! ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for request handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error taxonomy exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    DocumentNotFound,
    DocumentAlreadyExists,
    RequestValidationError,
    AccessDenied,
    RouteNotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DocumentNotFound => "document/document-not-found",
            ErrorCode::DocumentAlreadyExists => "document/document-already-exists",
            ErrorCode::RequestValidationError => "app/request-validation-error",
            ErrorCode::AccessDenied => "app/service-access-denied",
            ErrorCode::RouteNotFound => "app/route-not-found",
            ErrorCode::MethodNotAllowed => "app/method-not-allowed",
            ErrorCode::InternalServerError => "app/internal-server-error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform JSON error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = "document/document-not-found")]
    pub error_code: String,
    #[schema(example = "Document with '6756f47af9096fa27c21d567' not found.")]
    pub error_message: String,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Document with '{0}' not found.")]
    DocumentNotFound(String),

    #[error("{0}")]
    DocumentAlreadyExists(String),

    #[error("{0}")]
    Validation(String),

    /// Missing or rejected credential
    #[error("{0}")]
    Unauthorized(String),

    /// Valid credential without the required permission
    #[error("{0}")]
    Forbidden(String),

    #[error("Route '{0}' not found.")]
    RouteNotFound(String),

    #[error("Method '{0}' is not allowed on this route.")]
    MethodNotAllowed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::DocumentNotFound(_) => ErrorCode::DocumentNotFound,
            AppError::DocumentAlreadyExists(_) => ErrorCode::DocumentAlreadyExists,
            AppError::Validation(_) => ErrorCode::RequestValidationError,
            AppError::Unauthorized(_) | AppError::Forbidden(_) => ErrorCode::AccessDenied,
            AppError::RouteNotFound(_) => ErrorCode::RouteNotFound,
            AppError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
            AppError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DocumentAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The body sent to clients; internal details stay in the logs
    pub fn envelope(&self) -> ErrorEnvelope {
        let error_message = match self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        ErrorEnvelope {
            error_code: self.code().as_str().to_string(),
            error_message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(detail) => {
                tracing::error!(error_code = %self.code(), detail = %detail, "Request failed");
            },
            AppError::Unauthorized(message) | AppError::Forbidden(message) => {
                tracing::warn!(error_code = %self.code(), reason = %message, "Access denied");
            },
            _ => {
                tracing::debug!(error_code = %self.code(), message = %self, "Request rejected");
            },
        }

        (self.status(), Json(self.envelope())).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Router fallback for paths no route matches
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

/// Method-router fallback for a known path with an unsupported method
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
