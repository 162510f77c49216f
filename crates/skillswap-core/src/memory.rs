// In-memory implementations for dev mode and testing
//
// These implementations keep all data in memory, making them suitable for:
// - Running the API without a database
// - Unit and integration tests
//
// Conditional writes (insert_active, complete_if_active, append_feedback) check
// and mutate under a single write lock, so they are atomic per store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::events::RelayEvent;
use crate::feedback::Feedback;
use crate::friendship::{FriendRequest, FriendRequestStatus};
use crate::pair::PairKey;
use crate::session::{FeedbackLink, Session, SessionStatus};
use crate::traits::{
    Clock, EventPublisher, FeedbackStore, FriendshipStore, SessionStore, UserDirectory,
};
use crate::user::{CreateUser, UserProfile};

// ============================================================================
// InMemorySessionStore
// ============================================================================

/// In-memory session store
///
/// Stores sessions in a HashMap keyed by session ID.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, any status
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Pre-populate with a session (useful for testing)
    pub async fn seed(&self, session: Session) {
        self.sessions.write().await.insert(session.id, session);
    }
}

fn in_pair(session: &Session, pair: &PairKey) -> bool {
    session.pair_key().map(|k| k == *pair).unwrap_or(false)
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_active(&self, session: Session) -> Result<Session> {
        let pair = session.pair_key()?;
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions
            .values()
            .find(|s| s.is_active() && in_pair(s, &pair))
        {
            return Err(SessionError::conflict_with(
                "An active session already exists with this user",
                existing.clone(),
            ));
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn find_active(&self, pair: &PairKey) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.is_active() && in_pair(s, pair))
            .cloned())
    }

    async fn count_completed(&self, pair: &PairKey) -> Result<u32> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.status == SessionStatus::Completed && in_pair(s, pair))
            .count() as u32)
    }

    async fn list_completed(&self, pair: &PairKey) -> Result<Vec<Session>> {
        let mut completed: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.status == SessionStatus::Completed && in_pair(s, pair))
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.end_time.cmp(&a.end_time).then(b.id.cmp(&a.id)));
        Ok(completed)
    }

    async fn complete_if_active(
        &self,
        session_id: Uuid,
        ended_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(session) if session.is_active() => {
                session.complete(ended_by, now)?;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn append_feedback(
        &self,
        session_id: Uuid,
        link: FeedbackLink,
    ) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(session) if !session.has_feedback_from(link.user_id) => {
                session.add_feedback(link)?;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }
}

// ============================================================================
// InMemoryFriendshipStore
// ============================================================================

/// In-memory friend request store
#[derive(Debug, Default, Clone)]
pub struct InMemoryFriendshipStore {
    requests: Arc<RwLock<HashMap<Uuid, FriendRequest>>>,
}

impl InMemoryFriendshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make two users friends directly (useful for testing)
    pub async fn befriend(&self, a: Uuid, b: Uuid) -> FriendRequest {
        let now = Utc::now();
        let mut request = FriendRequest::new(a, b, None, now);
        request.respond(FriendRequestStatus::Accepted, now);
        request.chat_id = Some(Uuid::now_v7());
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        request
    }

    /// Mark the relation between two users removed (useful for testing)
    pub async fn unfriend(&self, a: Uuid, b: Uuid) {
        let now = Utc::now();
        for request in self.requests.write().await.values_mut() {
            if request.involves(a, b) {
                request.respond(FriendRequestStatus::Removed, now);
            }
        }
    }
}

#[async_trait]
impl FriendshipStore for InMemoryFriendshipStore {
    async fn get(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        Ok(self.requests.read().await.get(&request_id).cloned())
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Option<FriendRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .find(|r| r.involves(a, b))
            .cloned())
    }

    async fn save(&self, request: FriendRequest) -> Result<FriendRequest> {
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_pending_for(&self, receiver_id: Uuid) -> Result<Vec<FriendRequest>> {
        let mut pending: Vec<FriendRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.receiver_id == receiver_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn list_accepted_for(&self, user_id: Uuid) -> Result<Vec<FriendRequest>> {
        let mut accepted: Vec<FriendRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.is_accepted() && r.counterpart(user_id).is_some())
            .cloned()
            .collect();
        accepted.sort_by(|a, b| b.responded_at.cmp(&a.responded_at));
        Ok(accepted)
    }
}

// ============================================================================
// InMemoryUserDirectory
// ============================================================================

/// In-memory user directory
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active user with a generated email (useful for testing)
    pub async fn add_user(&self, name: &str) -> UserProfile {
        let user = UserProfile {
            id: Uuid::now_v7(),
            name: name.to_string(),
            email: format!("{}@campus.test", name.to_lowercase()),
            student_id: None,
            is_active: true,
            created_at: Utc::now(),
        };
        self.users.write().await.insert(user.id, user.clone());
        user
    }

    /// Flip a user's active flag
    pub async fn set_active(&self, user_id: Uuid, is_active: bool) {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.is_active = is_active;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create_user(&self, input: CreateUser) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        let email = input.email.trim().to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(SessionError::conflict("Email is already registered"));
        }
        let user = UserProfile {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email,
            student_id: input.student_id,
            is_active: true,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

// ============================================================================
// InMemoryFeedbackStore
// ============================================================================

/// In-memory feedback store
#[derive(Debug, Default, Clone)]
pub struct InMemoryFeedbackStore {
    feedback: Arc<RwLock<HashMap<Uuid, Feedback>>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn insert(&self, feedback: Feedback) -> Result<Feedback> {
        self.feedback
            .write()
            .await
            .insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    async fn get(&self, feedback_id: Uuid) -> Result<Option<Feedback>> {
        Ok(self.feedback.read().await.get(&feedback_id).cloned())
    }

    async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Feedback>> {
        let mut received: Vec<Feedback> = self
            .feedback
            .read()
            .await
            .values()
            .filter(|f| f.reviewee_id == reviewee_id)
            .cloned()
            .collect();
        received.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(received)
    }
}

// ============================================================================
// RecordingPublisher
// ============================================================================

/// Publisher that records every event instead of delivering it
///
/// Users listed as offline receive nothing, mirroring a relay with no connections.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Uuid, RelayEvent)>>,
    offline: Mutex<Vec<Uuid>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop events for this user from now on
    pub fn set_offline(&self, user_id: Uuid) {
        self.offline.lock().push(user_id);
    }

    /// Events delivered to one user, in publish order
    pub fn events_for(&self, user_id: Uuid) -> Vec<RelayEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(to, _)| *to == user_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<(Uuid, RelayEvent)> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, user_id: Uuid, event: &RelayEvent) -> usize {
        if self.offline.lock().contains(&user_id) {
            return 0;
        }
        self.events.lock().push((user_id, event.clone()));
        1
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(start)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_active_rejects_second_for_pair() {
        let store = InMemorySessionStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let first = Session::start(a, b, Uuid::now_v7(), 1, Utc::now());
        store.insert_active(first.clone()).await.unwrap();

        let second = Session::start(b, a, Uuid::now_v7(), 1, Utc::now());
        let err = store.insert_active(second).await.unwrap_err();
        assert_eq!(err.conflicting_session().map(|s| s.id), Some(first.id));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_complete_if_active_applies_once() {
        let store = InMemorySessionStore::new();
        let a = Uuid::now_v7();
        let session = Session::start(a, Uuid::now_v7(), Uuid::now_v7(), 1, Utc::now());
        store.insert_active(session.clone()).await.unwrap();

        let now = Utc::now();
        assert!(store.complete_if_active(session.id, a, now).await.unwrap().is_some());
        assert!(store.complete_if_active(session.id, a, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_completed_newest_first() {
        let store = InMemorySessionStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let start = Utc::now();
        for n in 1..=3 {
            let mut s = Session::start(a, b, Uuid::now_v7(), n, start);
            s.complete(a, start + Duration::minutes(n as i64)).unwrap();
            store.seed(s).await;
        }
        let pair = PairKey::new(a, b).unwrap();
        let history = store.list_completed(&pair).await.unwrap();
        let numbers: Vec<u32> = history.iter().map(|s| s.session_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(store.count_completed(&pair).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_friendship_found_in_either_direction() {
        let store = InMemoryFriendshipStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        store.befriend(a, b).await;
        assert!(store.exists_accepted_friendship(b, a).await.unwrap());
        store.unfriend(a, b).await;
        assert!(!store.exists_accepted_friendship(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let users = InMemoryUserDirectory::new();
        let input = CreateUser {
            name: "Asha".to_string(),
            email: "Asha@Campus.edu".to_string(),
            student_id: None,
        };
        let created = users.create_user(input.clone()).await.unwrap();
        assert_eq!(created.email, "asha@campus.edu");
        assert!(users.create_user(input).await.is_err());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::default();
        let before = clock.now();
        clock.advance(Duration::seconds(600));
        assert_eq!((clock.now() - before).num_seconds(), 600);
    }

    #[test]
    fn test_recording_publisher_drops_offline() {
        let publisher = RecordingPublisher::new();
        let user = Uuid::now_v7();
        publisher.set_offline(user);
        let event = RelayEvent::session_request(
            &crate::events::Actor::new(Uuid::now_v7(), "Asha"),
            Utc::now(),
        );
        assert_eq!(publisher.publish(user, &event), 0);
        assert!(publisher.all().is_empty());
    }

    #[tokio::test]
    async fn test_list_accepted_for_either_direction() {
        let store = InMemoryFriendshipStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        store.befriend(a, b).await;
        store.befriend(c, a).await;
        store
            .save(FriendRequest::new(Uuid::now_v7(), a, None, Utc::now()))
            .await
            .unwrap();

        let accepted = store.list_accepted_for(a).await.unwrap();
        let mut friends: Vec<Uuid> = accepted.iter().filter_map(|r| r.counterpart(a)).collect();
        friends.sort();
        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(friends, expected);

        store.unfriend(a, b).await;
        assert_eq!(store.list_accepted_for(b).await.unwrap().len(), 0);
    }
}
