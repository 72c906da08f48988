use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code returned alongside every failure
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidArgument(_) | AppError::Validation(_) => "INVALID_ARGUMENT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidTransition(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Re-labels a missing referenced entity as a bad argument.
    ///
    /// Used where the caller supplied the reference in a request body rather
    /// than addressing a resource by path.
    pub fn not_found_as_invalid_argument(self) -> Self {
        match self {
            AppError::NotFound(msg) => AppError::InvalidArgument(msg),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::InvalidArgument(ref msg) => (msg.clone(), Some(vec![msg.clone()])),
            AppError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            AppError::NotFound(ref msg)
            | AppError::BadRequest(ref msg)
            | AppError::InvalidTransition(ref msg)
            | AppError::Conflict(ref msg) => (msg.clone(), None),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), Some(code), errors));

        (status, body).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    /// One entry per violated rule, ordered for stable responses
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| match &violation.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, violation.code),
                })
            })
            .collect();
        messages.sort();

        AppError::Validation(messages)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
