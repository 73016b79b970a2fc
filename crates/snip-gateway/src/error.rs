use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortenerError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The short code does not resolve.
    NotFound,
    /// The custom short code is already in use.
    Conflict(String),
    /// The request body or a field in it is malformed.
    InvalidInput { status: StatusCode, message: String },
    /// No free short code could be generated.
    Unavailable(String),
    /// Storage failure; details are logged, not returned.
    Internal(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::AliasConflict(code) => {
                AppError::Conflict(format!("short code '{}' is already in use", code))
            }
            reserved @ ShortenerError::ReservedCode(_) => {
                AppError::invalid_input(reserved.to_string())
            }
            exhausted @ ShortenerError::Exhausted { .. } => {
                AppError::Unavailable(exhausted.to_string())
            }
            ShortenerError::Storage(source) => AppError::Internal(source.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "URL not found".to_string()),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::InvalidInput { status, message } => (status, message),
            AppError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
