// User directory HTTP routes
// Decision: Registration is open and unauthenticated; reading a profile requires identity

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use skillswap_core::{CreateUser, UserProfile};
use std::sync::Arc;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse};
use crate::identity::CurrentUser;
use crate::services::UserService;

/// App state for user routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<UserService>,
}

impl AppState {
    pub fn new(service: Arc<UserService>) -> Self {
        Self { service }
    }
}

/// Create user routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/:user_id", get(get_user))
        .with_state(state)
}

/// POST /v1/users - Register a user
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let user = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/users/{user_id} - Get a user profile
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.service.get(user_id).await?;
    Ok(Json(user))
}
