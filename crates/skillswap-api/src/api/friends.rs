// Friendship HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use skillswap_core::{Friend, FriendRequest};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse};
use crate::identity::CurrentUser;
use crate::services::FriendService;

/// Request to befriend another user
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendFriendRequest {
    pub receiver_id: Uuid,
    /// Optional note shown to the receiver.
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer to a pending friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestAction {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RespondFriendRequest {
    pub action: FriendRequestAction,
}

/// App state for friendship routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FriendService>,
}

impl AppState {
    pub fn new(service: Arc<FriendService>) -> Self {
        Self { service }
    }
}

/// Create friendship routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/friends", get(list_friends))
        .route(
            "/v1/friends/requests",
            post(send_request).get(list_pending_requests),
        )
        .route("/v1/friends/requests/:request_id", put(respond_to_request))
        .route("/v1/friends/:friend_id", delete(remove_friend))
        .with_state(state)
}

/// GET /v1/friends - The caller's friends and their chat threads
#[utoipa::path(
    get,
    path = "/v1/friends",
    responses(
        (status = 200, description = "Accepted friends", body = ListResponse<Friend>)
    ),
    tag = "friends"
)]
pub async fn list_friends(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ListResponse<Friend>>, ApiError> {
    let friends = state.service.list_friends(user.id).await?;
    Ok(Json(ListResponse::new(friends)))
}

/// POST /v1/friends/requests - Send a friend request
#[utoipa::path(
    post,
    path = "/v1/friends/requests",
    request_body = SendFriendRequest,
    responses(
        (status = 201, description = "Friend request sent", body = FriendRequest),
        (status = 400, description = "Already friends, already pending or self request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "friends"
)]
pub async fn send_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SendFriendRequest>,
) -> Result<(StatusCode, Json<FriendRequest>), ApiError> {
    let request = state
        .service
        .send_request(user.id, req.receiver_id, req.message)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/friends/requests - Pending requests received by the caller
#[utoipa::path(
    get,
    path = "/v1/friends/requests",
    responses(
        (status = 200, description = "Pending friend requests", body = ListResponse<FriendRequest>)
    ),
    tag = "friends"
)]
pub async fn list_pending_requests(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ListResponse<FriendRequest>>, ApiError> {
    let pending = state.service.pending(user.id).await?;
    Ok(Json(ListResponse::new(pending)))
}

/// PUT /v1/friends/requests/{request_id} - Accept or decline a request
#[utoipa::path(
    put,
    path = "/v1/friends/requests/{request_id}",
    params(
        ("request_id" = Uuid, Path, description = "Friend request ID")
    ),
    request_body = RespondFriendRequest,
    responses(
        (status = 200, description = "Request answered", body = FriendRequest),
        (status = 400, description = "Request already handled", body = ErrorResponse),
        (status = 403, description = "Caller is not the receiver", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "friends"
)]
pub async fn respond_to_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(req): Json<RespondFriendRequest>,
) -> Result<Json<FriendRequest>, ApiError> {
    let accept = req.action == FriendRequestAction::Accept;
    let request = state.service.respond(request_id, user.id, accept).await?;
    Ok(Json(request))
}

/// DELETE /v1/friends/{friend_id} - Remove a friend
#[utoipa::path(
    delete,
    path = "/v1/friends/{friend_id}",
    params(
        ("friend_id" = Uuid, Path, description = "Friend user ID")
    ),
    responses(
        (status = 200, description = "Friend removed", body = FriendRequest),
        (status = 404, description = "Friendship not found", body = ErrorResponse)
    ),
    tag = "friends"
)]
pub async fn remove_friend(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendRequest>, ApiError> {
    let request = state.service.remove(user.id, friend_id).await?;
    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_deserialize() {
        let req: RespondFriendRequest = serde_json::from_str(r#"{"action": "accept"}"#).unwrap();
        assert_eq!(req.action, FriendRequestAction::Accept);
        assert!(serde_json::from_str::<RespondFriendRequest>(r#"{"action": "maybe"}"#).is_err());
    }
}
