// Repository layer for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use skillswap_core::{Feedback, FeedbackLink, FriendRequest, PairKey, Session};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

const SESSION_COLUMNS: &str = "id, participant_a, participant_b, chat_id, started_by, start_time, \
     end_time, duration_seconds, status, ended_by, feedback_given, session_number, \
     is_first_session, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    /// Insert a user; returns None when the email is already taken
    pub async fn create_user(&self, input: CreateUserRow) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, student_id, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, student_id, is_active, created_at
            "#,
        )
        .bind(input.id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, student_id, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Friend requests
    // ============================================

    pub async fn get_friend_request(&self, id: Uuid) -> Result<Option<FriendRequestRow>> {
        let row = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, message, chat_id, created_at, responded_at
            FROM friend_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_friend_request(&self, pair: &PairKey) -> Result<Option<FriendRequestRow>> {
        let row = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, message, chat_id, created_at, responded_at
            FROM friend_requests
            WHERE pair_low = $1 AND pair_high = $2
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert or overwrite the request for its pair
    pub async fn upsert_friend_request(
        &self,
        request: &FriendRequest,
        pair: &PairKey,
    ) -> Result<FriendRequestRow> {
        let row = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            INSERT INTO friend_requests
                (id, sender_id, receiver_id, pair_low, pair_high, status, message, chat_id, created_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                sender_id = EXCLUDED.sender_id,
                receiver_id = EXCLUDED.receiver_id,
                status = EXCLUDED.status,
                message = EXCLUDED.message,
                chat_id = EXCLUDED.chat_id,
                created_at = EXCLUDED.created_at,
                responded_at = EXCLUDED.responded_at
            RETURNING id, sender_id, receiver_id, status, message, chat_id, created_at, responded_at
            "#,
        )
        .bind(request.id)
        .bind(request.sender_id)
        .bind(request.receiver_id)
        .bind(pair.low())
        .bind(pair.high())
        .bind(request.status.as_str())
        .bind(&request.message)
        .bind(request.chat_id)
        .bind(request.created_at)
        .bind(request.responded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_pending_friend_requests(
        &self,
        receiver_id: Uuid,
    ) -> Result<Vec<FriendRequestRow>> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, message, chat_id, created_at, responded_at
            FROM friend_requests
            WHERE receiver_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_accepted_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestRow>> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, message, chat_id, created_at, responded_at
            FROM friend_requests
            WHERE (sender_id = $1 OR receiver_id = $1) AND status = 'accepted'
            ORDER BY responded_at DESC NULLS LAST, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Sessions
    // ============================================

    /// Insert an active session; returns None if the pair already has one
    pub async fn insert_active_session(&self, session: &Session) -> Result<Option<SessionRow>> {
        let pair = session.pair_key()?;
        let query = format!(
            r#"
            INSERT INTO sessions
                (id, participant_a, participant_b, pair_low, pair_high, chat_id, started_by,
                 start_time, status, feedback_given, session_number, is_first_session,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', '[]'::jsonb, $9, $10, $11, $11)
            ON CONFLICT (pair_low, pair_high) WHERE status = 'active' DO NOTHING
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session.id)
            .bind(session.participants[0])
            .bind(session.participants[1])
            .bind(pair.low())
            .bind(pair.high())
            .bind(session.chat_id)
            .bind(session.started_by)
            .bind(session.start_time)
            .bind(session.session_number as i32)
            .bind(session.is_first_session)
            .bind(session.created_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<Option<SessionRow>> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn find_active_session(&self, pair: &PairKey) -> Result<Option<SessionRow>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE pair_low = $1 AND pair_high = $2 AND status = 'active'"
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(pair.low())
            .bind(pair.high())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn count_completed_sessions(&self, pair: &PairKey) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sessions
            WHERE pair_low = $1 AND pair_high = $2 AND status = 'completed'
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_completed_sessions(&self, pair: &PairKey) -> Result<Vec<SessionRow>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE pair_low = $1 AND pair_high = $2 AND status = 'completed' \
             ORDER BY end_time DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(pair.low())
            .bind(pair.high())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Complete a session only while it is still active
    pub async fn complete_session(
        &self,
        id: Uuid,
        ended_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRow>> {
        let query = format!(
            r#"
            UPDATE sessions
            SET
                end_time = GREATEST($3, start_time),
                duration_seconds = FLOOR(EXTRACT(EPOCH FROM (GREATEST($3, start_time) - start_time)))::BIGINT,
                status = 'completed',
                ended_by = $2,
                updated_at = $3
            WHERE id = $1 AND status = 'active'
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(ended_by)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Append a feedback link unless the user already has one
    pub async fn append_session_feedback(
        &self,
        id: Uuid,
        link: &FeedbackLink,
    ) -> Result<Option<SessionRow>> {
        let entry = serde_json::to_value(link)?;
        let already_given = json!([{ "user_id": link.user_id }]);
        let query = format!(
            r#"
            UPDATE sessions
            SET
                feedback_given = feedback_given || jsonb_build_array($2::jsonb),
                updated_at = $4
            WHERE id = $1 AND NOT (feedback_given @> $3::jsonb)
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(entry)
            .bind(already_given)
            .bind(link.given_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    // ============================================
    // Feedback
    // ============================================

    pub async fn create_feedback(&self, feedback: &Feedback) -> Result<FeedbackRow> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO feedback
                (id, reviewer_id, reviewee_id, rating, comment, skill_category, session_type, session_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, reviewer_id, reviewee_id, rating, comment, skill_category, session_type, session_id, created_at
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.reviewer_id)
        .bind(feedback.reviewee_id)
        .bind(feedback.rating as i16)
        .bind(&feedback.comment)
        .bind(&feedback.skill_category)
        .bind(feedback.session_type.as_str())
        .bind(feedback.session_id)
        .bind(feedback.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_feedback(&self, id: Uuid) -> Result<Option<FeedbackRow>> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, reviewer_id, reviewee_id, rating, comment, skill_category, session_type, session_id, created_at
            FROM feedback
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_feedback_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<FeedbackRow>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, reviewer_id, reviewee_id, rating, comment, skill_category, session_type, session_id, created_at
            FROM feedback
            WHERE reviewee_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
