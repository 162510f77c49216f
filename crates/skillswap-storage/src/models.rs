// Database models (internal, may differ from domain types)
//
// Row structs mirror table columns. Conversions into skillswap-core types live
// next to the rows so every store adapter decodes the same way.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use skillswap_core::{
    Feedback, FeedbackLink, FriendRequest, FriendRequestStatus, Session, SessionStatus,
    SessionType, UserProfile,
};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            student_id: row.student_id,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

// ============================================
// Friend requests
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct FriendRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub message: Option<String>,
    pub chat_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<FriendRequestRow> for FriendRequest {
    fn from(row: FriendRequestRow) -> Self {
        FriendRequest {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            status: FriendRequestStatus::from(row.status.as_str()),
            message: row.message,
            chat_id: row.chat_id,
            created_at: row.created_at,
            responded_at: row.responded_at,
        }
    }
}

// ============================================
// Sessions
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub chat_id: Uuid,
    pub started_by: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub status: String,
    pub ended_by: Option<Uuid>,
    pub feedback_given: sqlx::types::JsonValue,
    pub session_number: i32,
    pub is_first_session: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = anyhow::Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        let feedback_given: Vec<FeedbackLink> = serde_json::from_value(row.feedback_given)
            .with_context(|| format!("decoding feedback_given for session {}", row.id))?;
        let session_number = u32::try_from(row.session_number)
            .with_context(|| format!("negative session_number for session {}", row.id))?;

        Ok(Session {
            id: row.id,
            participants: [row.participant_a, row.participant_b],
            chat_id: row.chat_id,
            started_by: row.started_by,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_seconds: row.duration_seconds,
            status: SessionStatus::from(row.status.as_str()),
            ended_by: row.ended_by,
            feedback_given,
            session_number,
            is_first_session: row.is_first_session,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ============================================
// Feedback
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub skill_category: String,
    pub session_type: String,
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = anyhow::Error;

    fn try_from(row: FeedbackRow) -> Result<Self> {
        let rating = u8::try_from(row.rating)
            .with_context(|| format!("rating out of range for feedback {}", row.id))?;
        Ok(Feedback {
            id: row.id,
            reviewer_id: row.reviewer_id,
            reviewee_id: row.reviewee_id,
            rating,
            comment: row.comment,
            skill_category: row.skill_category,
            session_type: SessionType::from(row.session_type.as_str()),
            session_id: row.session_id,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session_row(feedback_given: serde_json::Value) -> SessionRow {
        let now = Utc::now();
        SessionRow {
            id: Uuid::now_v7(),
            participant_a: Uuid::now_v7(),
            participant_b: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            started_by: Uuid::now_v7(),
            start_time: now,
            end_time: Some(now),
            duration_seconds: Some(0),
            status: "completed".to_string(),
            ended_by: None,
            feedback_given,
            session_number: 2,
            is_first_session: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_session_row_decodes_feedback_links() {
        let user_id = Uuid::now_v7();
        let feedback_id = Uuid::now_v7();
        let row = session_row(json!([{
            "user_id": user_id,
            "feedback_id": feedback_id,
            "given_at": "2025-01-06T09:10:00Z"
        }]));

        let session = Session::try_from(row).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.session_number, 2);
        assert_eq!(session.feedback_given.len(), 1);
        assert_eq!(session.feedback_given[0].feedback_id, feedback_id);
        assert!(session.has_feedback_from(user_id));
    }

    #[test]
    fn test_session_row_rejects_malformed_feedback() {
        let row = session_row(json!({"not": "an array"}));
        assert!(Session::try_from(row).is_err());
    }

    #[test]
    fn test_feedback_row_rating_range() {
        let row = FeedbackRow {
            id: Uuid::now_v7(),
            reviewer_id: Uuid::now_v7(),
            reviewee_id: Uuid::now_v7(),
            rating: 4,
            comment: String::new(),
            skill_category: "Rust".to_string(),
            session_type: "tutoring".to_string(),
            session_id: None,
            created_at: Utc::now(),
        };
        let feedback = Feedback::try_from(row.clone()).unwrap();
        assert_eq!(feedback.rating, 4);
        assert_eq!(feedback.session_type, SessionType::Tutoring);

        let bad = FeedbackRow { rating: -1, ..row };
        assert!(Feedback::try_from(bad).is_err());
    }
}
