//! Error types for the Libris server

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Presented username matches no stored user. Kept apart from
    /// [`AppError::NotFound`] so the credential path never reports 404.
    #[error("Unknown principal: {0}")]
    PrincipalNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Id mismatch: {0}")]
    IdMismatch(String),

    #[error("Already owned: {0}")]
    AlreadyOwned(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transport or decoding failure while talking to Open Library.
    /// Never folded into `NotFound`.
    #[error("Open Library error: {0}")]
    OpenLibrary(String),

    /// Backing store unreachable, reported by the readiness endpoint.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub property: String,
    pub message: String,
}

/// Error response body: a timestamp plus either one message or a list
/// of field errors, never both
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    pub date: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn message(message: String) -> Self {
        Self {
            message: Some(message),
            errors: None,
            date: Utc::now(),
        }
    }

    pub fn errors(errors: Vec<FieldError>) -> Self {
        Self {
            message: None,
            errors: Some(errors),
            date: Utc::now(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::message(msg))
            }
            AppError::PrincipalNotFound(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::message(msg))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::message(msg)),
            AppError::IdMismatch(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::AlreadyOwned(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, ErrorResponse::errors(errors)),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::OpenLibrary(msg) => {
                tracing::warn!("Open Library error: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorResponse::message(msg))
            }
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::message(msg))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Database error".to_string()),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Internal server error".to_string()),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"libris\""),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            use sqlx::error::ErrorKind;

            // Integrity violations are caller errors, not server faults
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return AppError::Conflict(db_err.message().to_string());
                }
                _ => {}
            }
        }

        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(property, violations)| {
                violations.iter().map(move |violation| FieldError {
                    property: property.to_string(),
                    message: violation
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", property)),
                })
            })
            .collect();

        // Deterministic order regardless of the underlying map
        fields.sort_by(|a, b| a.property.cmp(&b.property));

        AppError::Validation(fields)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
