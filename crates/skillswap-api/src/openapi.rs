// OpenAPI document for the public API

use skillswap_core::{
    CategorySummary, CreateFeedback, CreateUser, Feedback, FeedbackLink, FeedbackSummary,
    Friend, FriendRequest, FriendRequestStatus, RatingStats, Session, SessionStats, SessionStatus,
    SessionType, UserProfile,
};
use utoipa::OpenApi;

use crate::api::{feedback, friends, sessions, users};
use crate::api::{ErrorResponse, ListResponse, MessageResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::start_session,
        sessions::get_active_session,
        sessions::get_session_count,
        sessions::end_session,
        sessions::record_feedback,
        sessions::get_session_history,
        sessions::request_session,
        sessions::get_session,
        users::create_user,
        users::get_user,
        friends::list_friends,
        friends::send_request,
        friends::list_pending_requests,
        friends::respond_to_request,
        friends::remove_friend,
        feedback::create_feedback,
        feedback::list_user_feedback,
        feedback::get_feedback_summary,
    ),
    components(
        schemas(
            Session, SessionStatus, FeedbackLink, SessionStats,
            sessions::StartSessionRequest,
            sessions::RecordFeedbackRequest,
            sessions::SessionRequestBody,
            sessions::SessionResponse,
            sessions::ActiveSessionResponse,
            sessions::EndSessionResponse,
            UserProfile, CreateUser,
            Friend, FriendRequest, FriendRequestStatus,
            friends::SendFriendRequest,
            friends::RespondFriendRequest,
            friends::FriendRequestAction,
            Feedback, CreateFeedback, SessionType,
            FeedbackSummary, RatingStats, CategorySummary,
            ErrorResponse, MessageResponse,
            ListResponse<Session>,
            ListResponse<FriendRequest>,
            ListResponse<Friend>,
            ListResponse<Feedback>,
        )
    ),
    tags(
        (name = "sessions", description = "Skill-sharing session lifecycle"),
        (name = "users", description = "User directory"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "feedback", description = "Ratings and rating summaries")
    ),
    info(
        title = "Campus Skill Swap API",
        version = "0.1.0",
        description = "Sessions, friendships and feedback between students",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Render the document as pretty JSON
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
