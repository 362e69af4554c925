//! Error handling and API error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;

/// ApiErrorResponse
///
/// JSON envelope returned for every failed dashboard request.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// ApiError
///
/// Errors surfaced by dashboard handlers. Page-level failures (a failed load or
/// mutation) are rendered into the page itself; this type covers requests that
/// cannot produce a page at all.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Backend(_) => "BACKEND_ERROR",
            ApiError::Session(_) => "SESSION_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Backend and signing details stay in the logs.
        let message = match &self {
            ApiError::Backend(e) => {
                tracing::error!("Backend error: {:?}", e);
                "The platform backend could not complete the request".to_string()
            }
            ApiError::Session(e) => {
                tracing::error!("Session signing error: {:?}", e);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ApiErrorResponse {
            error: ApiErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for dashboard handlers.
pub type ApiResult<T> = Result<T, ApiError>;
