// Database-backed FeedbackStore implementation

use async_trait::async_trait;
use skillswap_core::{traits::FeedbackStore, Feedback, Result, SessionError};
use uuid::Uuid;

use crate::repositories::Database;

#[derive(Clone)]
pub struct DbFeedbackStore {
    db: Database,
}

impl DbFeedbackStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedbackStore for DbFeedbackStore {
    async fn insert(&self, feedback: Feedback) -> Result<Feedback> {
        let row = self
            .db
            .create_feedback(&feedback)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Feedback::try_from(row).map_err(|e| SessionError::store(e.to_string()))
    }

    async fn get(&self, feedback_id: Uuid) -> Result<Option<Feedback>> {
        self.db
            .get_feedback(feedback_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(|row| Feedback::try_from(row).map_err(|e| SessionError::store(e.to_string())))
            .transpose()
    }

    async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Feedback>> {
        self.db
            .list_feedback_for_reviewee(reviewee_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .into_iter()
            .map(|row| Feedback::try_from(row).map_err(|e| SessionError::store(e.to_string())))
            .collect()
    }
}
