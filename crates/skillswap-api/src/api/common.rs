// Common DTOs for the public API
//
// These types are shared across multiple API endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use skillswap_core::{Session, SessionError};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
    /// The session the request collided with, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            session: None,
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// SessionError rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Forbidden(_) => StatusCode::FORBIDDEN,
            SessionError::Conflict { .. }
            | SessionError::LimitExceeded { .. }
            | SessionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SessionError::Store(_) | SessionError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            err @ (SessionError::Store(_) | SessionError::Internal(_)) => {
                tracing::error!("Request failed: {}", err);
                ErrorResponse::new("Internal server error")
            }
            SessionError::Conflict { message, session } => ErrorResponse {
                error: message,
                session: session.map(|s| *s),
            },
            other => ErrorResponse::new(other.to_string()),
        };
        body.into_response(status).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use uuid::Uuid;

    async fn render(err: SessionError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        assert_eq!(render(SessionError::not_found("x")).await.0, StatusCode::NOT_FOUND);
        assert_eq!(render(SessionError::forbidden("x")).await.0, StatusCode::FORBIDDEN);
        assert_eq!(render(SessionError::limit_exceeded(5)).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(render(SessionError::invalid("x")).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(
            render(SessionError::store("db down")).await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_conflict_carries_session() {
        let session = Session::start(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), 1, Utc::now());
        let (status, body) = render(SessionError::conflict_with(
            "An active session already exists with this user",
            session.clone(),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["session"]["id"], session.id.to_string());
    }

    #[tokio::test]
    async fn test_store_errors_are_not_leaked() {
        let (_, body) = render(SessionError::store("password=hunter2")).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("session").is_none());
    }
}
