//! API errors
//!
//! Every failure leaves as `{"error": "<message>"}`. Storage details are
//! logged and replaced by a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formkit_core::RepositoryError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Submission not found")]
    NotFound,

    #[error("Request body is too large")]
    PayloadTooLarge,

    /// Storage failure; the message is what the client sees
    #[error("{message}")]
    Storage { message: &'static str, source: RepositoryError },
}

impl ApiError {
    /// Map a repository error, using `message` for storage failures
    pub fn from_repository(message: &'static str) -> impl FnOnce(RepositoryError) -> ApiError {
        move |e| match e {
            RepositoryError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage { message, source: other },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage { message, source } = &self {
            error!(error = %source, "{}", message);
        }
        let body = ErrorBody { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}
