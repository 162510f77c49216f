// Feedback service
//
// Feedback records are independent of sessions; the session only stores a link.
// Linking checks that the record exists and belongs to the requester.

use skillswap_core::{
    Clock, CreateFeedback, Feedback, FeedbackStore, FeedbackSummary, Result, Session,
    SessionError, UserDirectory,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct FeedbackService {
    feedback: Arc<dyn FeedbackStore>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl FeedbackService {
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feedback,
            users,
            clock,
        }
    }

    pub async fn create(&self, reviewer_id: Uuid, input: CreateFeedback) -> Result<Feedback> {
        let feedback = input.into_feedback(reviewer_id, self.clock.now())?;

        let reviewee = self.users.get_user(feedback.reviewee_id).await?;
        if !reviewee.map(|u| u.is_active).unwrap_or(false) {
            return Err(SessionError::not_found("User not found"));
        }

        let feedback = self.feedback.insert(feedback).await?;
        tracing::info!(
            feedback_id = %feedback.id,
            %reviewer_id,
            reviewee_id = %feedback.reviewee_id,
            rating = feedback.rating,
            "Feedback submitted"
        );
        Ok(feedback)
    }

    /// Feedback received by a user, newest first
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<Feedback>> {
        self.ensure_user(user_id).await?;
        self.feedback.list_for_reviewee(user_id).await
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<FeedbackSummary> {
        self.ensure_user(user_id).await?;
        let received = self.feedback.list_for_reviewee(user_id).await?;
        Ok(FeedbackSummary::from_feedback(&received))
    }

    /// Load a feedback record the requester wrote
    pub async fn get_owned(&self, feedback_id: Uuid, reviewer_id: Uuid) -> Result<Feedback> {
        let feedback = self
            .feedback
            .get(feedback_id)
            .await?
            .ok_or_else(|| SessionError::not_found("Feedback not found"))?;
        if feedback.reviewer_id != reviewer_id {
            return Err(SessionError::forbidden(
                "Feedback was written by another user",
            ));
        }
        Ok(feedback)
    }

    /// Load feedback the requester wrote about the other participant of `session`
    pub async fn get_for_session(
        &self,
        feedback_id: Uuid,
        reviewer_id: Uuid,
        session: &Session,
    ) -> Result<Feedback> {
        let feedback = self.get_owned(feedback_id, reviewer_id).await?;
        if session.other_participant(reviewer_id) != Some(feedback.reviewee_id) {
            return Err(SessionError::invalid(
                "Feedback must be about the other participant of this session",
            ));
        }
        if feedback.session_id.is_some_and(|id| id != session.id) {
            return Err(SessionError::invalid(
                "Feedback was submitted for a different session",
            ));
        }
        Ok(feedback)
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        match self.users.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(SessionError::not_found("User not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skillswap_core::memory::{InMemoryFeedbackStore, InMemoryUserDirectory, ManualClock};

    struct Fixture {
        service: FeedbackService,
        users: Arc<InMemoryUserDirectory>,
        asha: Uuid,
        ben: Uuid,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserDirectory::new());
        let asha = users.add_user("Asha").await.id;
        let ben = users.add_user("Ben").await.id;
        let service = FeedbackService::new(
            Arc::new(InMemoryFeedbackStore::new()),
            users.clone(),
            Arc::new(ManualClock::default()),
        );
        Fixture {
            service,
            users,
            asha,
            ben,
        }
    }

    fn rating(reviewee_id: Uuid, session_id: Option<Uuid>) -> CreateFeedback {
        CreateFeedback {
            reviewee_id,
            rating: 4,
            comment: None,
            skill_category: "Rust".to_string(),
            session_type: None,
            session_id,
        }
    }

    #[tokio::test]
    async fn test_inactive_reviewee_is_not_found() {
        let f = fixture().await;
        f.users.set_active(f.ben, false).await;

        let err = f.service.create(f.asha, rating(f.ben, None)).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_feedback_for_session_must_target_peer() {
        let f = fixture().await;
        let chen = f.users.add_user("Chen").await.id;
        let session = Session::start(f.asha, f.ben, Uuid::now_v7(), 1, Utc::now());

        let about_ben = f.service.create(f.asha, rating(f.ben, None)).await.unwrap();
        let about_chen = f.service.create(f.asha, rating(chen, None)).await.unwrap();

        assert!(f
            .service
            .get_for_session(about_ben.id, f.asha, &session)
            .await
            .is_ok());
        let err = f
            .service
            .get_for_session(about_chen.id, f.asha, &session)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_feedback_for_other_session_is_rejected() {
        let f = fixture().await;
        let session = Session::start(f.asha, f.ben, Uuid::now_v7(), 1, Utc::now());
        let elsewhere = f
            .service
            .create(f.asha, rating(f.ben, Some(Uuid::now_v7())))
            .await
            .unwrap();

        let err = f
            .service
            .get_for_session(elsewhere.id, f.asha, &session)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));
    }
}
