// Feedback HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use skillswap_core::{CreateFeedback, Feedback, FeedbackSummary};
use std::sync::Arc;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::identity::CurrentUser;
use crate::services::FeedbackService;

/// App state for feedback routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FeedbackService>,
}

impl AppState {
    pub fn new(service: Arc<FeedbackService>) -> Self {
        Self { service }
    }
}

/// Create feedback routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/feedback", post(create_feedback))
        .route("/v1/feedback/users/:user_id", get(list_user_feedback))
        .route("/v1/feedback/users/:user_id/summary", get(get_feedback_summary))
        .with_state(state)
}

/// POST /v1/feedback - Rate another user
#[utoipa::path(
    post,
    path = "/v1/feedback",
    request_body = CreateFeedback,
    responses(
        (status = 201, description = "Feedback created", body = Feedback),
        (status = 400, description = "Invalid rating, comment or category", body = ErrorResponse),
        (status = 404, description = "Reviewee not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateFeedback>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let feedback = state.service.create(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// GET /v1/feedback/users/{user_id} - Feedback a user received
#[utoipa::path(
    get,
    path = "/v1/feedback/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Feedback received, newest first", body = ListResponse<Feedback>),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
pub async fn list_user_feedback(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ListResponse<Feedback>>, ApiError> {
    let feedback = state.service.list_for(user_id).await?;
    Ok(Json(ListResponse::new(feedback)))
}

/// GET /v1/feedback/users/{user_id}/summary - Rating summary for a profile
#[utoipa::path(
    get,
    path = "/v1/feedback/users/{user_id}/summary",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Rating summary", body = FeedbackSummary),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "feedback"
)]
pub async fn get_feedback_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FeedbackSummary>, ApiError> {
    let summary = state.service.summary(user_id).await?;
    Ok(Json(summary))
}
