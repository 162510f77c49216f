// Session engine integration tests
//
// Drives the engine end to end over the in-memory stores with a manual clock
// and a recording publisher.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use skillswap_core::memory::{
    InMemoryFriendshipStore, InMemorySessionStore, InMemoryUserDirectory, ManualClock,
    RecordingPublisher,
};
use skillswap_core::{
    CreateUser, EngineConfig, Notification, RelayEvent, SessionEngine, SessionError,
    SessionStatus, SessionStore, UserDirectory, UserProfile,
};

struct Harness {
    engine: SessionEngine,
    sessions: Arc<InMemorySessionStore>,
    friendships: Arc<InMemoryFriendshipStore>,
    users: Arc<InMemoryUserDirectory>,
    publisher: Arc<RecordingPublisher>,
    clock: Arc<ManualClock>,
    a: Uuid,
    b: Uuid,
}

async fn harness_with(config: EngineConfig) -> Harness {
    let users = Arc::new(InMemoryUserDirectory::new());
    let a = users.add_user("Asha").await.id;
    let b = users.add_user("Ben").await.id;

    let friendships = Arc::new(InMemoryFriendshipStore::new());
    friendships.befriend(a, b).await;

    let sessions = Arc::new(InMemorySessionStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let clock = Arc::new(ManualClock::default());

    let engine = SessionEngine::new(
        sessions.clone(),
        friendships.clone(),
        users.clone(),
        publisher.clone(),
        clock.clone(),
        config,
    );

    Harness {
        engine,
        sessions,
        friendships,
        users,
        publisher,
        clock,
        a,
        b,
    }
}

async fn harness() -> Harness {
    harness_with(EngineConfig::default()).await
}

impl Harness {
    /// Start and end one session, returning its id
    async fn complete_one(&self) -> Uuid {
        let session = self
            .engine
            .start_session(self.a, self.b, Uuid::now_v7())
            .await
            .unwrap();
        self.clock.advance(Duration::minutes(30));
        self.engine.end_session(session.id, self.a).await.unwrap();
        session.id
    }
}

#[tokio::test]
async fn test_start_then_end_scenario() {
    let h = harness().await;
    let chat_id = Uuid::now_v7();

    let session = h.engine.start_session(h.a, h.b, chat_id).await.unwrap();
    assert_eq!(session.session_number, 1);
    assert!(session.is_first_session);
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.chat_id, chat_id);

    h.clock.advance(Duration::seconds(600));
    let ended = h.engine.end_session(session.id, h.a).await.unwrap();
    assert_eq!(ended.duration_seconds, 600);
    assert_eq!(ended.session.status, SessionStatus::Completed);
    assert_eq!(ended.session.ended_by, Some(h.a));

    let to_b = h.publisher.events_for(h.b);
    match &to_b[0] {
        RelayEvent::SessionStarted {
            session: s,
            started_by,
            message,
        } => {
            assert_eq!(s.id, session.id);
            assert_eq!(started_by.id, h.a);
            assert_eq!(message, "Asha started a skill-sharing session");
        }
        other => panic!("expected sessionStarted, got {:?}", other),
    }
    assert!(to_b.iter().any(|e| matches!(
        e,
        RelayEvent::SessionEndedNotification { session_id, receiver_name, .. }
            if *session_id == session.id && receiver_name == "Ben"
    )));
    assert!(to_b.iter().any(|e| matches!(
        e,
        RelayEvent::Notification(Notification::SessionFeedback { sender_id, .. }) if *sender_id == h.a
    )));
}

#[tokio::test]
async fn test_either_participant_may_end() {
    let h = harness().await;
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    let ended = h.engine.end_session(session.id, h.b).await.unwrap();
    assert_eq!(ended.session.ended_by, Some(h.b));

    // The starter is the peer here and receives the end notices
    assert_eq!(h.publisher.events_for(h.a).len(), 3);
}

#[tokio::test]
async fn test_non_participant_cannot_end() {
    let h = harness().await;
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    let err = h
        .engine
        .end_session(session.id, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(_)));
}

#[tokio::test]
async fn test_end_unknown_session_not_found() {
    let h = harness().await;
    let err = h.engine.end_session(Uuid::now_v7(), h.a).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn test_double_end_conflicts() {
    let h = harness().await;
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    h.engine.end_session(session.id, h.a).await.unwrap();

    let err = h.engine.end_session(session.id, h.b).await.unwrap_err();
    assert!(matches!(err, SessionError::Conflict { .. }));
    assert_eq!(err.to_string(), "Session already ended");
}

#[tokio::test]
async fn test_concurrent_ends_yield_one_success() {
    let h = harness().await;
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();

    let (first, second) = tokio::join!(
        h.engine.end_session(session.id, h.a),
        h.engine.end_session(session.id, h.b)
    );
    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
}

#[tokio::test]
async fn test_second_start_conflicts_with_existing_session() {
    let h = harness().await;
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();

    let err = h
        .engine
        .start_session(h.b, h.a, Uuid::now_v7())
        .await
        .unwrap_err();
    assert_eq!(err.conflicting_session().map(|s| s.id), Some(session.id));
}

#[tokio::test]
async fn test_concurrent_starts_leave_one_active() {
    let h = harness().await;

    let (first, second) = tokio::join!(
        h.engine.start_session(h.a, h.b, Uuid::now_v7()),
        h.engine.start_session(h.b, h.a, Uuid::now_v7())
    );
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(err, SessionError::Conflict { .. }));
    assert_eq!(h.sessions.len().await, 1);
}

#[tokio::test]
async fn test_pair_cap_allows_five_sessions() {
    let h = harness().await;
    for n in 1..=4 {
        h.complete_one().await;
        assert_eq!(h.engine.session_count(h.a, h.b).await.unwrap(), n);
    }

    // Fifth start succeeds with the next number
    let fifth = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    assert_eq!(fifth.session_number, 5);
    assert!(!fifth.is_first_session);
    h.engine.end_session(fifth.id, h.b).await.unwrap();

    let err = h
        .engine
        .start_session(h.a, h.b, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::LimitExceeded { limit: 5 }));

    let stats = h.engine.session_stats(h.b, h.a).await.unwrap();
    assert_eq!(stats.session_count, 5);
    assert!(!stats.can_start_new_session);
    assert!(!h.engine.can_start_session(h.a, h.b).await.unwrap());
}

#[tokio::test]
async fn test_session_number_follows_completed_count() {
    let h = harness().await;
    h.complete_one().await;
    h.complete_one().await;
    let third = h.engine.start_session(h.b, h.a, Uuid::now_v7()).await.unwrap();
    assert_eq!(third.session_number, 3);
}

#[tokio::test]
async fn test_non_friends_forbidden_without_record() {
    let h = harness().await;
    let stranger = h.users.add_user("Cy").await.id;

    let err = h
        .engine
        .start_session(h.a, stranger, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(_)));
    assert!(h.sessions.is_empty().await);
    assert!(h.publisher.events_for(stranger).is_empty());
}

#[tokio::test]
async fn test_friendship_checked_before_active_session() {
    let h = harness().await;
    h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    h.friendships.unfriend(h.a, h.b).await;

    let err = h
        .engine
        .start_session(h.a, h.b, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(_)));
}

#[tokio::test]
async fn test_feedback_recorded_once_per_user() {
    let h = harness().await;
    let session_id = h.complete_one().await;

    let first = Uuid::now_v7();
    let session = h.engine.record_feedback(session_id, h.a, first).await.unwrap();
    assert_eq!(session.feedback_given.len(), 1);
    assert_eq!(session.feedback_given[0].feedback_id, first);
    assert_eq!(session.status, SessionStatus::Completed);

    let err = h
        .engine
        .record_feedback(session_id, h.a, Uuid::now_v7())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Feedback already submitted for this session");

    let session = h.engine.record_feedback(session_id, h.b, Uuid::now_v7()).await.unwrap();
    assert_eq!(session.feedback_given.len(), 2);
    assert!(session.feedback_pending().is_empty());
}

#[tokio::test]
async fn test_concurrent_feedback_never_duplicates() {
    let h = harness().await;
    let session_id = h.complete_one().await;

    let (first, second) = tokio::join!(
        h.engine.record_feedback(session_id, h.a, Uuid::now_v7()),
        h.engine.record_feedback(session_id, h.a, Uuid::now_v7())
    );
    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);

    let session = h.engine.get_session(session_id, h.a).await.unwrap();
    assert_eq!(session.feedback_given.len(), 1);
}

#[tokio::test]
async fn test_history_newest_first() {
    let h = harness().await;
    let first = h.complete_one().await;
    let second = h.complete_one().await;
    h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();

    let history = h.engine.history(h.b, h.a).await.unwrap();
    let ids: Vec<Uuid> = history.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn test_active_session_lookup() {
    let h = harness().await;
    assert!(h.engine.active_session(h.a, h.b).await.unwrap().is_none());
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    let active = h.engine.active_session(h.b, h.a).await.unwrap();
    assert_eq!(active.map(|s| s.id), Some(session.id));
}

#[tokio::test]
async fn test_request_new_session_rules() {
    let h = harness().await;

    let err = h.engine.request_new_session(h.a, h.b).await.unwrap_err();
    assert_eq!(err.to_string(), "First session does not require a request");

    h.complete_one().await;
    h.publisher.clear();
    h.engine.request_new_session(h.a, h.b).await.unwrap();

    let to_b = h.publisher.events_for(h.b);
    assert_eq!(to_b.len(), 1);
    assert_eq!(to_b[0].notification_type(), Some("session_request"));
    assert_eq!(h.engine.session_count(h.a, h.b).await.unwrap(), 1);
}

#[tokio::test]
async fn test_request_new_session_at_cap() {
    let h = harness_with(EngineConfig::default().with_max_sessions_per_pair(1)).await;
    h.complete_one().await;
    let err = h.engine.request_new_session(h.a, h.b).await.unwrap_err();
    assert!(matches!(err, SessionError::LimitExceeded { limit: 1 }));
}

#[tokio::test]
async fn test_request_new_session_unknown_peer() {
    let h = harness().await;
    // A pair with history but no profile for the peer
    let ghost = Uuid::now_v7();
    h.friendships.befriend(h.a, ghost).await;
    let session = h.engine.start_session(h.a, ghost, Uuid::now_v7()).await.unwrap();
    h.engine.end_session(session.id, h.a).await.unwrap();

    let err = h.engine.request_new_session(h.a, ghost).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn test_offline_peer_does_not_affect_result() {
    let h = harness().await;
    h.publisher.set_offline(h.b);
    let session = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    h.engine.end_session(session.id, h.a).await.unwrap();
    assert!(h.publisher.all().is_empty());
}

#[tokio::test]
async fn test_required_feedback_blocks_next_session() {
    let h = harness_with(EngineConfig::default().with_required_feedback(true)).await;
    let previous = h.complete_one().await;

    let err = h
        .engine
        .start_session(h.a, h.b, Uuid::now_v7())
        .await
        .unwrap_err();
    assert_eq!(err.conflicting_session().map(|s| s.id), Some(previous));

    h.engine.record_feedback(previous, h.a, Uuid::now_v7()).await.unwrap();
    let next = h.engine.start_session(h.a, h.b, Uuid::now_v7()).await.unwrap();
    assert_eq!(next.session_number, 2);
}

/// Directory whose profile lookups always fail
struct UnavailableUsers;

#[async_trait]
impl UserDirectory for UnavailableUsers {
    async fn create_user(&self, _input: CreateUser) -> skillswap_core::Result<UserProfile> {
        Err(SessionError::store("user lookup down"))
    }

    async fn get_user(&self, _user_id: Uuid) -> skillswap_core::Result<Option<UserProfile>> {
        Err(SessionError::store("user lookup down"))
    }
}

#[tokio::test]
async fn test_profile_lookup_failure_does_not_fail_transitions() {
    let a = Uuid::now_v7();
    let b = Uuid::now_v7();
    let friendships = Arc::new(InMemoryFriendshipStore::new());
    friendships.befriend(a, b).await;
    let sessions = Arc::new(InMemorySessionStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let clock = Arc::new(ManualClock::default());

    let engine = SessionEngine::new(
        sessions.clone(),
        friendships,
        Arc::new(UnavailableUsers),
        publisher.clone(),
        clock.clone(),
        EngineConfig::default(),
    );

    let session = engine.start_session(a, b, Uuid::now_v7()).await.unwrap();
    clock.advance(Duration::seconds(90));
    let ended = engine.end_session(session.id, b).await.unwrap();
    assert_eq!(ended.duration_seconds, 90);

    let stored = sessions.get(session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Completed);

    match &publisher.events_for(b)[0] {
        RelayEvent::SessionStarted { started_by, .. } => {
            assert_eq!(started_by.id, a);
            assert_eq!(started_by.name, "Your friend");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(publisher.events_for(a).len(), 3);
}
