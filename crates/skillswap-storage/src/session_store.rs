// Database-backed SessionStore implementation
//
// The partial unique index on (pair_low, pair_high) WHERE status = 'active'
// enforces one active session per pair; completion and feedback appends are
// guarded UPDATEs, so concurrent callers see exactly one success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skillswap_core::{
    traits::SessionStore, FeedbackLink, PairKey, Result, Session, SessionError,
};
use uuid::Uuid;

use crate::models::SessionRow;
use crate::repositories::Database;

// ============================================================================
// DbSessionStore - Persists sessions in Postgres
// ============================================================================

#[derive(Clone)]
pub struct DbSessionStore {
    db: Database,
}

impl DbSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn to_session(row: SessionRow) -> Result<Session> {
    Session::try_from(row).map_err(|e| SessionError::store(e.to_string()))
}

fn to_sessions(rows: Vec<SessionRow>) -> Result<Vec<Session>> {
    rows.into_iter().map(to_session).collect()
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn insert_active(&self, session: Session) -> Result<Session> {
        let inserted = self
            .db
            .insert_active_session(&session)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;

        match inserted {
            Some(row) => to_session(row),
            None => {
                // Lost the race for the pair's active slot
                let pair = session.pair_key()?;
                match self.find_active(&pair).await? {
                    Some(existing) => Err(SessionError::conflict_with(
                        "An active session already exists with this user",
                        existing,
                    )),
                    None => Err(SessionError::conflict(
                        "An active session already exists with this user",
                    )),
                }
            }
        }
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.db
            .get_session(session_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(to_session)
            .transpose()
    }

    async fn find_active(&self, pair: &PairKey) -> Result<Option<Session>> {
        self.db
            .find_active_session(pair)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(to_session)
            .transpose()
    }

    async fn count_completed(&self, pair: &PairKey) -> Result<u32> {
        let count = self
            .db
            .count_completed_sessions(pair)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_completed(&self, pair: &PairKey) -> Result<Vec<Session>> {
        let rows = self
            .db
            .list_completed_sessions(pair)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        to_sessions(rows)
    }

    async fn complete_if_active(
        &self,
        session_id: Uuid,
        ended_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        self.db
            .complete_session(session_id, ended_by, now)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(to_session)
            .transpose()
    }

    async fn append_feedback(
        &self,
        session_id: Uuid,
        link: FeedbackLink,
    ) -> Result<Option<Session>> {
        self.db
            .append_session_feedback(session_id, &link)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(to_session)
            .transpose()
    }
}
