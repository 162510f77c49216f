// Core traits for pluggable backends
//
// These traits allow the session engine to be used with different backends:
// - In-memory implementations for dev mode and testing
// - Database implementations for production
// - A WebSocket connection registry for event delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::events::RelayEvent;
use crate::feedback::Feedback;
use crate::friendship::FriendRequest;
use crate::pair::PairKey;
use crate::session::{FeedbackLink, Session};
use crate::user::{CreateUser, UserProfile};

// ============================================================================
// SessionStore - Persists session records
// ============================================================================

/// Trait for storing and querying sessions
///
/// Every write targets a single session record. Writes that depend on the
/// current state (insert, complete, append feedback) must apply atomically
/// with their check.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new active session.
    ///
    /// Fails with `SessionError::Conflict` carrying the existing session if the
    /// pair already has an active one.
    async fn insert_active(&self, session: Session) -> Result<Session>;

    /// Load a session by ID
    async fn get(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// The active session for a pair, if any
    async fn find_active(&self, pair: &PairKey) -> Result<Option<Session>>;

    /// Number of completed sessions for a pair
    async fn count_completed(&self, pair: &PairKey) -> Result<u32>;

    /// Completed sessions for a pair, newest first
    async fn list_completed(&self, pair: &PairKey) -> Result<Vec<Session>>;

    /// Mark a session completed if it is still active.
    ///
    /// Returns `None` when the session is missing or no longer active.
    async fn complete_if_active(
        &self,
        session_id: Uuid,
        ended_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>>;

    /// Append a feedback link unless the user already has one on this session.
    ///
    /// Returns `None` when the session is missing or the user already gave feedback.
    async fn append_feedback(&self, session_id: Uuid, link: FeedbackLink)
        -> Result<Option<Session>>;
}

// ============================================================================
// FriendshipStore - Friend requests and the accepted-friendship check
// ============================================================================

#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Load a friend request by ID
    async fn get(&self, request_id: Uuid) -> Result<Option<FriendRequest>>;

    /// The request between two users, in either direction
    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Option<FriendRequest>>;

    /// Insert or overwrite a request
    async fn save(&self, request: FriendRequest) -> Result<FriendRequest>;

    /// Pending requests received by a user, newest first
    async fn list_pending_for(&self, receiver_id: Uuid) -> Result<Vec<FriendRequest>>;

    /// Accepted requests the user is on, in either direction, most recently accepted first
    async fn list_accepted_for(&self, user_id: Uuid) -> Result<Vec<FriendRequest>>;

    /// Whether the two users have an accepted friendship
    async fn exists_accepted_friendship(&self, a: Uuid, b: Uuid) -> Result<bool> {
        Ok(self
            .find_between(a, b)
            .await?
            .map(|r| r.is_accepted())
            .unwrap_or(false))
    }
}

// ============================================================================
// UserDirectory - User profiles
// ============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, input: CreateUser) -> Result<UserProfile>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>>;
}

// ============================================================================
// FeedbackStore - Rating records
// ============================================================================

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, feedback: Feedback) -> Result<Feedback>;

    async fn get(&self, feedback_id: Uuid) -> Result<Option<Feedback>>;

    /// Feedback received by a user, newest first
    async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Feedback>>;
}

// ============================================================================
// EventPublisher - Real-time delivery
// ============================================================================

/// Trait for pushing events to a user's connected clients
///
/// Delivery is best-effort: an offline user simply receives nothing.
/// Implementations must not block on slow clients.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every connection of `user_id`.
    /// Returns how many connections it was handed to.
    fn publish(&self, user_id: Uuid, event: &RelayEvent) -> usize;
}

// ============================================================================
// Clock - Source of "now"
// ============================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
