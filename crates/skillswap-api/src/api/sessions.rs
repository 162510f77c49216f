// Skill-sharing session HTTP routes
//
// Thin handlers over SessionEngine. The requester always comes from the
// X-User-Id header; the friend is named in the path or body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skillswap_core::{Session, SessionEngine, SessionError, SessionStats};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse, MessageResponse};
use crate::identity::CurrentUser;
use crate::services::FeedbackService;

/// Request to start a session with a friend
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// The friend to start the session with.
    pub friend_id: Uuid,
    /// Chat thread the session belongs to.
    pub chat_id: Uuid,
}

/// Request to link submitted feedback to a session
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordFeedbackRequest {
    /// ID returned by POST /v1/feedback.
    pub feedback_id: Uuid,
}

/// Request to ask a friend for another session
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SessionRequestBody {
    pub friend_id: Uuid,
}

/// A session together with a status message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub session: Session,
}

/// Active session lookup result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveSessionResponse {
    pub session: Session,
}

/// Result of ending a session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndSessionResponse {
    pub message: String,
    pub session: Session,
    /// Whole seconds between start and end.
    pub duration: i64,
}

/// App state for session routes
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
    pub feedback: Arc<FeedbackService>,
}

impl AppState {
    pub fn new(engine: Arc<SessionEngine>, feedback: Arc<FeedbackService>) -> Self {
        Self { engine, feedback }
    }
}

/// Create session routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/sessions/start", post(start_session))
        .route("/v1/sessions/request", post(request_session))
        .route("/v1/sessions/active/:friend_id", get(get_active_session))
        .route("/v1/sessions/count/:friend_id", get(get_session_count))
        .route("/v1/sessions/history/:friend_id", get(get_session_history))
        .route("/v1/sessions/:session_id", get(get_session))
        .route("/v1/sessions/:session_id/end", post(end_session))
        .route("/v1/sessions/:session_id/feedback", post(record_feedback))
        .with_state(state)
}

/// POST /v1/sessions/start - Start a session with a friend
#[utoipa::path(
    post,
    path = "/v1/sessions/start",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionResponse),
        (status = 400, description = "Active session exists or session limit reached", body = ErrorResponse),
        (status = 401, description = "Missing or invalid X-User-Id"),
        (status = 403, description = "Users are not friends", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn start_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state
        .engine
        .start_session(user.id, req.friend_id, req.chat_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "Session started successfully".to_string(),
            session,
        }),
    ))
}

/// GET /v1/sessions/active/{friend_id} - Active session with a friend
#[utoipa::path(
    get,
    path = "/v1/sessions/active/{friend_id}",
    params(
        ("friend_id" = Uuid, Path, description = "Friend user ID")
    ),
    responses(
        (status = 200, description = "Active session", body = ActiveSessionResponse),
        (status = 404, description = "No active session", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn get_active_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<ActiveSessionResponse>, ApiError> {
    let session = state
        .engine
        .active_session(user.id, friend_id)
        .await?
        .ok_or_else(|| SessionError::not_found("No active session"))?;

    Ok(Json(ActiveSessionResponse { session }))
}

/// GET /v1/sessions/count/{friend_id} - Completed sessions and remaining allowance
#[utoipa::path(
    get,
    path = "/v1/sessions/count/{friend_id}",
    params(
        ("friend_id" = Uuid, Path, description = "Friend user ID")
    ),
    responses(
        (status = 200, description = "Session allowance", body = SessionStats)
    ),
    tag = "sessions"
)]
pub async fn get_session_count(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<SessionStats>, ApiError> {
    let stats = state.engine.session_stats(user.id, friend_id).await?;
    Ok(Json(stats))
}

/// POST /v1/sessions/{session_id}/end - End an active session
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/end",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session ended", body = EndSessionResponse),
        (status = 400, description = "Session already ended", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn end_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<EndSessionResponse>, ApiError> {
    let ended = state.engine.end_session(session_id, user.id).await?;

    Ok(Json(EndSessionResponse {
        message: "Session ended successfully".to_string(),
        session: ended.session,
        duration: ended.duration_seconds,
    }))
}

/// POST /v1/sessions/{session_id}/feedback - Link feedback to a session
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/feedback",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = RecordFeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = SessionResponse),
        (status = 400, description = "Feedback already submitted, or not about this session", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Session or feedback not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn record_feedback(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RecordFeedbackRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.engine.get_session(session_id, user.id).await?;
    state
        .feedback
        .get_for_session(req.feedback_id, user.id, &session)
        .await?;
    let session = state
        .engine
        .record_feedback(session_id, user.id, req.feedback_id)
        .await?;

    Ok(Json(SessionResponse {
        message: "Feedback recorded for this session".to_string(),
        session,
    }))
}

/// GET /v1/sessions/history/{friend_id} - Completed sessions, newest first
#[utoipa::path(
    get,
    path = "/v1/sessions/history/{friend_id}",
    params(
        ("friend_id" = Uuid, Path, description = "Friend user ID")
    ),
    responses(
        (status = 200, description = "Completed sessions", body = ListResponse<Session>)
    ),
    tag = "sessions"
)]
pub async fn get_session_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<ListResponse<Session>>, ApiError> {
    let sessions = state.engine.history(user.id, friend_id).await?;
    Ok(Json(ListResponse::new(sessions)))
}

/// POST /v1/sessions/request - Ask a friend for another session
#[utoipa::path(
    post,
    path = "/v1/sessions/request",
    request_body = SessionRequestBody,
    responses(
        (status = 200, description = "Request delivered", body = MessageResponse),
        (status = 400, description = "First session or limit reached", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn request_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SessionRequestBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .engine
        .request_new_session(user.id, req.friend_id)
        .await?;
    Ok(Json(MessageResponse::new("Session request sent")))
}

/// GET /v1/sessions/{session_id} - Get a session
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session found", body = Session),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let session = state.engine.get_session(session_id, user.id).await?;
    Ok(Json(session))
}
