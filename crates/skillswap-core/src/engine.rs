// Session lifecycle engine
//
// Validates and applies every state transition of a skill-sharing session:
// start, end, feedback recording and follow-up requests. The engine holds no
// state of its own; it reads and writes through the store traits and pushes
// peer notifications through an EventPublisher.
//
// Precondition order for start is fixed: friendship, active session, pair cap,
// then (when enabled) feedback on the previous session. First failure wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::config::EngineConfig;
use crate::error::{Result, SessionError};
use crate::events::{Actor, RelayEvent};
use crate::pair::PairKey;
use crate::session::{FeedbackLink, Session};
use crate::traits::{Clock, EventPublisher, FriendshipStore, SessionStore, UserDirectory};

/// Result of ending a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EndedSession {
    pub session: Session,
    pub duration_seconds: i64,
}

/// Session allowance for a pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SessionStats {
    pub session_count: u32,
    pub can_start_new_session: bool,
    pub max_sessions: u32,
}

/// Session lifecycle engine
pub struct SessionEngine {
    sessions: Arc<dyn SessionStore>,
    friendships: Arc<dyn FriendshipStore>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl SessionEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        friendships: Arc<dyn FriendshipStore>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            sessions,
            friendships,
            users,
            publisher,
            clock,
            config,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Completed sessions for the pair
    pub async fn session_count(&self, a: Uuid, b: Uuid) -> Result<u32> {
        let pair = PairKey::new(a, b)?;
        self.sessions.count_completed(&pair).await
    }

    /// Whether the pair is still under its session cap
    pub async fn can_start_session(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let count = self.session_count(a, b).await?;
        Ok(count < self.config.max_sessions_per_pair)
    }

    pub async fn session_stats(&self, a: Uuid, b: Uuid) -> Result<SessionStats> {
        let session_count = self.session_count(a, b).await?;
        Ok(SessionStats {
            session_count,
            can_start_new_session: session_count < self.config.max_sessions_per_pair,
            max_sessions: self.config.max_sessions_per_pair,
        })
    }

    pub async fn active_session(&self, a: Uuid, b: Uuid) -> Result<Option<Session>> {
        let pair = PairKey::new(a, b)?;
        self.sessions.find_active(&pair).await
    }

    /// Completed sessions for the pair, newest first
    pub async fn history(&self, a: Uuid, b: Uuid) -> Result<Vec<Session>> {
        let pair = PairKey::new(a, b)?;
        self.sessions.list_completed(&pair).await
    }

    /// Read one session; only its participants may see it
    pub async fn get_session(&self, session_id: Uuid, requester: Uuid) -> Result<Session> {
        self.load_for_participant(session_id, requester).await
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Start a session between the requester and a friend
    pub async fn start_session(
        &self,
        requester: Uuid,
        peer: Uuid,
        chat_id: Uuid,
    ) -> Result<Session> {
        let pair = PairKey::new(requester, peer)?;

        if !self
            .friendships
            .exists_accepted_friendship(requester, peer)
            .await?
        {
            return Err(SessionError::forbidden(
                "You can only start sessions with friends",
            ));
        }

        if let Some(existing) = self.sessions.find_active(&pair).await? {
            return Err(SessionError::conflict_with(
                "An active session already exists with this user",
                existing,
            ));
        }

        let count = self.sessions.count_completed(&pair).await?;
        if count >= self.config.max_sessions_per_pair {
            return Err(SessionError::limit_exceeded(
                self.config.max_sessions_per_pair,
            ));
        }

        if self.config.require_feedback_before_next_session && count > 0 {
            let previous = self.sessions.list_completed(&pair).await?.into_iter().next();
            if let Some(previous) = previous {
                if !previous.has_feedback_from(requester) {
                    return Err(SessionError::conflict_with(
                        "Submit feedback for your previous session before starting a new one",
                        previous,
                    ));
                }
            }
        }

        let session = Session::start(requester, peer, chat_id, count + 1, self.clock.now());
        let session = self.sessions.insert_active(session).await?;

        info!(
            session_id = %session.id,
            pair = %pair,
            session_number = session.session_number,
            "Session started"
        );

        let starter = self.actor(requester).await;
        self.notify(peer, RelayEvent::session_started(session.clone(), starter));

        Ok(session)
    }

    /// End an active session; either participant may end it
    pub async fn end_session(&self, session_id: Uuid, requester: Uuid) -> Result<EndedSession> {
        let session = self.load_for_participant(session_id, requester).await?;
        if !session.is_active() {
            return Err(SessionError::conflict("Session already ended"));
        }

        let now = self.clock.now();
        let session = self
            .sessions
            .complete_if_active(session_id, requester, now)
            .await?
            .ok_or_else(|| SessionError::conflict("Session already ended"))?;
        let duration_seconds = session.duration_seconds.unwrap_or(0);

        info!(
            session_id = %session.id,
            ended_by = %requester,
            duration_seconds,
            "Session ended"
        );

        if let Some(peer) = session.other_participant(requester) {
            let ender = self.actor(requester).await;
            let receiver_name = self.actor(peer).await.name;

            self.notify(peer, RelayEvent::session_ended(session.clone(), ender.clone()));
            self.notify(
                peer,
                RelayEvent::session_ended_notification(session.id, ender.clone(), receiver_name, now),
            );
            self.notify(peer, RelayEvent::session_feedback(&ender, session.id, now));
        }

        Ok(EndedSession {
            session,
            duration_seconds,
        })
    }

    /// Link a feedback record to a session, once per participant
    pub async fn record_feedback(
        &self,
        session_id: Uuid,
        requester: Uuid,
        feedback_id: Uuid,
    ) -> Result<Session> {
        let session = self.load_for_participant(session_id, requester).await?;
        if session.has_feedback_from(requester) {
            return Err(SessionError::conflict(
                "Feedback already submitted for this session",
            ));
        }

        let link = FeedbackLink {
            user_id: requester,
            feedback_id,
            given_at: self.clock.now(),
        };
        let session = self
            .sessions
            .append_feedback(session_id, link)
            .await?
            .ok_or_else(|| SessionError::conflict("Feedback already submitted for this session"))?;

        debug!(
            session_id = %session.id,
            user_id = %requester,
            %feedback_id,
            "Feedback recorded"
        );

        Ok(session)
    }

    /// Ask a friend for another session after the first one.
    ///
    /// Creates no record; the peer only receives a notification.
    pub async fn request_new_session(&self, requester: Uuid, peer: Uuid) -> Result<()> {
        let count = self.session_count(requester, peer).await?;
        if count == 0 {
            return Err(SessionError::conflict(
                "First session does not require a request",
            ));
        }
        if count >= self.config.max_sessions_per_pair {
            return Err(SessionError::limit_exceeded(
                self.config.max_sessions_per_pair,
            ));
        }
        if self.users.get_user(peer).await?.is_none() {
            return Err(SessionError::not_found("User not found"));
        }

        let sender = self.actor(requester).await;
        self.notify(peer, RelayEvent::session_request(&sender, self.clock.now()));

        debug!(requester = %requester, peer = %peer, "Session request sent");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_for_participant(&self, session_id: Uuid, requester: Uuid) -> Result<Session> {
        let session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| SessionError::not_found("Session not found"))?;
        if !session.is_participant(requester) {
            return Err(SessionError::forbidden(
                "You are not a participant in this session",
            ));
        }
        Ok(session)
    }

    /// Display identity for notifications. Never fails: the operation result
    /// is decided by the store write, not by the profile lookup.
    async fn actor(&self, user_id: Uuid) -> Actor {
        match self.users.get_user(user_id).await {
            Ok(Some(user)) => Actor::new(user_id, user.name),
            Ok(None) => {
                warn!(user_id = %user_id, "No profile for user, using placeholder name");
                Actor::unknown(user_id)
            }
            Err(e) => {
                warn!(user_id = %user_id, "Profile lookup failed, using placeholder name: {}", e);
                Actor::unknown(user_id)
            }
        }
    }

    fn notify(&self, user_id: Uuid, event: RelayEvent) {
        let delivered = self.publisher.publish(user_id, &event);
        debug!(
            user_id = %user_id,
            event = event.event_type(),
            delivered,
            "Relayed event"
        );
    }
}
