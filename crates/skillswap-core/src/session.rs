// Session domain types
//
// A Session is one timed collaboration window between exactly two users.
// Used by the engine, both storage backends and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, SessionError};
use crate::pair::PairKey;

/// Session status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    /// Reserved; no operation produces it today
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SessionStatus {
    fn from(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "cancelled" => SessionStatus::Cancelled,
            _ => SessionStatus::Active,
        }
    }
}

/// Record that a participant submitted feedback for a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FeedbackLink {
    pub user_id: Uuid,
    pub feedback_id: Uuid,
    pub given_at: DateTime<Utc>,
}

/// Session - timed skill-sharing window between two friends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Session {
    pub id: Uuid,
    /// Requester first, peer second. Order carries no meaning beyond that.
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Uuid>))]
    pub participants: [Uuid; 2],
    pub chat_id: Uuid,
    pub started_by: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_by: Option<Uuid>,
    #[serde(default)]
    pub feedback_given: Vec<FeedbackLink>,
    pub session_number: u32,
    pub is_first_session: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh active session. `session_number` is 1-based.
    pub fn start(
        requester: Uuid,
        peer: Uuid,
        chat_id: Uuid,
        session_number: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            participants: [requester, peer],
            chat_id,
            started_by: requester,
            start_time: now,
            end_time: None,
            duration_seconds: None,
            status: SessionStatus::Active,
            ended_by: None,
            feedback_given: Vec::new(),
            session_number,
            is_first_session: session_number == 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pair_key(&self) -> Result<PairKey> {
        PairKey::new(self.participants[0], self.participants[1])
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        match self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn has_feedback_from(&self, user_id: Uuid) -> bool {
        self.feedback_given.iter().any(|f| f.user_id == user_id)
    }

    /// Participants who have not recorded feedback yet
    pub fn feedback_pending(&self) -> Vec<Uuid> {
        self.participants
            .iter()
            .copied()
            .filter(|p| !self.has_feedback_from(*p))
            .collect()
    }

    /// Transition active → completed.
    ///
    /// Stamps end time, whole-second duration (never negative) and the ender.
    pub fn complete(&mut self, ended_by: Uuid, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::conflict("Session already ended"));
        }
        let end_time = now.max(self.start_time);
        self.end_time = Some(end_time);
        self.duration_seconds = Some(elapsed_seconds(self.start_time, end_time));
        self.status = SessionStatus::Completed;
        self.ended_by = Some(ended_by);
        self.updated_at = now;
        Ok(())
    }

    /// Append a feedback link; one per participant
    pub fn add_feedback(&mut self, link: FeedbackLink) -> Result<()> {
        if self.has_feedback_from(link.user_id) {
            return Err(SessionError::conflict(
                "Feedback already submitted for this session",
            ));
        }
        self.updated_at = link.given_at;
        self.feedback_given.push(link);
        Ok(())
    }
}

/// Whole seconds between two instants, floored and clamped at zero
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_session() -> (Session, Uuid, Uuid) {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        (Session::start(a, b, Uuid::now_v7(), 1, Utc::now()), a, b)
    }

    #[test]
    fn test_status_roundtrip_strings() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(SessionStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_start_sets_first_session() {
        let (session, a, _) = new_session();
        assert!(session.is_first_session);
        assert_eq!(session.session_number, 1);
        assert_eq!(session.started_by, a);
        assert!(session.is_active());
        assert!(session.end_time.is_none());
    }

    #[test]
    fn test_later_session_is_not_first() {
        let session = Session::start(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), 3, Utc::now());
        assert!(!session.is_first_session);
    }

    #[test]
    fn test_complete_floors_duration() {
        let (mut session, _, b) = new_session();
        let end = session.start_time + Duration::milliseconds(90_999);
        session.complete(b, end).unwrap();
        assert_eq!(session.duration_seconds, Some(90));
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.ended_by, Some(b));
    }

    #[test]
    fn test_complete_twice_conflicts() {
        let (mut session, a, _) = new_session();
        let now = session.start_time;
        session.complete(a, now).unwrap();
        let err = session.complete(a, now).unwrap_err();
        assert!(matches!(err, SessionError::Conflict { .. }));
    }

    #[test]
    fn test_complete_with_clock_skew_is_not_negative() {
        let (mut session, a, _) = new_session();
        let before = session.start_time - Duration::seconds(5);
        session.complete(a, before).unwrap();
        assert_eq!(session.duration_seconds, Some(0));
    }

    #[test]
    fn test_feedback_once_per_participant() {
        let (mut session, a, b) = new_session();
        let link = FeedbackLink {
            user_id: a,
            feedback_id: Uuid::now_v7(),
            given_at: Utc::now(),
        };
        session.add_feedback(link.clone()).unwrap();
        assert!(session.add_feedback(link).is_err());
        assert_eq!(session.feedback_given.len(), 1);
        assert_eq!(session.feedback_pending(), vec![b]);
    }

    #[test]
    fn test_other_participant() {
        let (session, a, b) = new_session();
        assert_eq!(session.other_participant(a), Some(b));
        assert_eq!(session.other_participant(b), Some(a));
        assert_eq!(session.other_participant(Uuid::now_v7()), None);
    }
}
