// Error types for session coordination

use thiserror::Error;

use crate::session::Session;

/// Result type alias for engine and store operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while coordinating sessions
#[derive(Debug, Error)]
pub enum SessionError {
    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Requester is not a participant, or the users are not friends
    #[error("{0}")]
    Forbidden(String),

    /// A state precondition was violated.
    /// Carries the session the caller collided with, when there is one.
    #[error("{message}")]
    Conflict {
        message: String,
        session: Option<Box<Session>>,
    },

    /// The pair has used up its session allowance
    #[error("Maximum session limit ({limit}) reached with this user")]
    LimitExceeded { limit: u32 },

    /// Malformed input
    #[error("{0}")]
    InvalidRequest(String),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SessionError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        SessionError::NotFound(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        SessionError::Forbidden(msg.into())
    }

    /// Create a conflict error without an attached session
    pub fn conflict(msg: impl Into<String>) -> Self {
        SessionError::Conflict {
            message: msg.into(),
            session: None,
        }
    }

    /// Create a conflict error pointing at the session that caused it
    pub fn conflict_with(msg: impl Into<String>, session: Session) -> Self {
        SessionError::Conflict {
            message: msg.into(),
            session: Some(Box::new(session)),
        }
    }

    /// Create a limit exceeded error
    pub fn limit_exceeded(limit: u32) -> Self {
        SessionError::LimitExceeded { limit }
    }

    /// Create an invalid request error
    pub fn invalid(msg: impl Into<String>) -> Self {
        SessionError::InvalidRequest(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        SessionError::Store(msg.into())
    }

    /// Session attached to a conflict, if any
    pub fn conflicting_session(&self) -> Option<&Session> {
        match self {
            SessionError::Conflict { session, .. } => session.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_message() {
        let err = SessionError::limit_exceeded(5);
        assert_eq!(
            err.to_string(),
            "Maximum session limit (5) reached with this user"
        );
    }

    #[test]
    fn test_conflict_without_session() {
        let err = SessionError::conflict("Session already ended");
        assert_eq!(err.to_string(), "Session already ended");
        assert!(err.conflicting_session().is_none());
    }
}
