//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::{AttendeeError, AuthError, EventError};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid or insufficient credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with current state
    #[error("{0}")]
    Conflict(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request outlived the server's request timeout
    #[error("Request timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timed out".to_string(),
            ),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Conflict => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Hashing(e) => {
                error!("Password hashing failed: {}", e);
                ApiError::InternalServerError
            }
            AuthError::Token(e) => {
                error!("Token generation failed: {}", e);
                ApiError::InternalServerError
            }
            AuthError::Storage(e) => ApiError::Database(e),
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound | EventError::UserNotFound => ApiError::NotFound(err.to_string()),
            EventError::Validation(msg) => ApiError::BadRequest(msg),
            EventError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            EventError::Storage(e) => ApiError::Database(e),
        }
    }
}

impl From<AttendeeError> for ApiError {
    fn from(err: AttendeeError) -> Self {
        match err {
            AttendeeError::NotFound | AttendeeError::UserNotFound => {
                ApiError::NotFound(err.to_string())
            }
            AttendeeError::CapacityExceeded | AttendeeError::AlreadyRegistered => {
                ApiError::Conflict(err.to_string())
            }
            AttendeeError::Storage(e) => ApiError::Database(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_use_case_errors_map_to_statuses() {
        let cases = [
            (ApiError::from(AuthError::Conflict), StatusCode::CONFLICT),
            (
                ApiError::from(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from(EventError::Validation("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(EventError::UserNotFound), StatusCode::NOT_FOUND),
            (
                ApiError::from(EventError::Unauthorized),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::from(AttendeeError::NotFound), StatusCode::NOT_FOUND),
            (
                ApiError::from(AttendeeError::UserNotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(AttendeeError::CapacityExceeded),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(AttendeeError::AlreadyRegistered),
                StatusCode::CONFLICT,
            ),
            (ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ApiError::Timeout, StatusCode::REQUEST_TIMEOUT),
        ];

        for (err, expected) in cases {
            let (status, _) = render(err).await;
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_hides_storage_details() {
        let err = ApiError::from(AttendeeError::Storage(DatabaseError::Migration(
            "secret detail".to_string(),
        )));

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_error_body_carries_message() {
        let (status, body) = render(ApiError::from(AttendeeError::CapacityExceeded)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({ "error": "Event has reached maximum capacity" })
        );
    }
}
