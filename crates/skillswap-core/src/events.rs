// Relay events pushed to connected clients
//
// RelayEvent is the wire contract for server-initiated pushes. Every event kind
// is its own variant carrying exactly the fields that kind needs.
//
// Wire frame: {"event": "<name>", "data": {...}}
// The "notification" event is further tagged by "type" (friend_request, session_request, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Session;

/// Name used in notifications when the acting user's profile is unavailable
pub const UNKNOWN_USER_NAME: &str = "Your friend";

/// A user as named in a notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Stand-in for a user whose profile could not be loaded
    pub fn unknown(id: Uuid) -> Self {
        Self::new(id, UNKNOWN_USER_NAME)
    }
}

/// Events pushed through the relay to a single user's connections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum RelayEvent {
    /// A friend started a session with the recipient
    #[serde(rename = "sessionStarted")]
    SessionStarted {
        session: Session,
        started_by: Actor,
        message: String,
    },

    /// A session the recipient participates in was ended by the other side
    #[serde(rename = "sessionEnded")]
    SessionEnded {
        session: Session,
        ended_by: Actor,
        duration_seconds: i64,
        message: String,
    },

    /// Client-facing variant of the end notice, consumed by the UI layer
    #[serde(rename = "sessionEndedNotification")]
    SessionEndedNotification {
        session_id: Uuid,
        ended_by: Actor,
        receiver_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// General notification bell entry
    #[serde(rename = "notification")]
    Notification(Notification),
}

/// Notification payloads, tagged by "type"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    FriendRequest {
        sender_id: Uuid,
        sender_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    FriendAccepted {
        friend_id: Uuid,
        friend_name: String,
        /// Chat thread assigned to the new friendship
        chat_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },
    FriendRemoved {
        friend_id: Uuid,
        friend_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    SessionRequest {
        sender_id: Uuid,
        sender_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    SessionFeedback {
        sender_id: Uuid,
        sender_name: String,
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl RelayEvent {
    /// Create a session started event
    pub fn session_started(session: Session, started_by: Actor) -> Self {
        let message = format!("{} started a skill-sharing session", started_by.name);
        RelayEvent::SessionStarted {
            session,
            started_by,
            message,
        }
    }

    /// Create a session ended event
    pub fn session_ended(session: Session, ended_by: Actor) -> Self {
        let message = format!("{} ended the session", ended_by.name);
        RelayEvent::SessionEnded {
            duration_seconds: session.duration_seconds.unwrap_or(0),
            session,
            ended_by,
            message,
        }
    }

    /// Create the client-facing session end event
    pub fn session_ended_notification(
        session_id: Uuid,
        ended_by: Actor,
        receiver_name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = format!(
            "{} has ended the session. You can provide feedback.",
            ended_by.name
        );
        RelayEvent::SessionEndedNotification {
            session_id,
            ended_by,
            receiver_name: receiver_name.into(),
            message,
            timestamp,
        }
    }

    /// Create a friend request notification
    pub fn friend_request(sender: &Actor, timestamp: DateTime<Utc>) -> Self {
        RelayEvent::Notification(Notification::FriendRequest {
            sender_id: sender.id,
            sender_name: sender.name.clone(),
            message: format!("{} sent you a friend request", sender.name),
            timestamp,
        })
    }

    /// Create a friend accepted notification
    pub fn friend_accepted(friend: &Actor, chat_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        RelayEvent::Notification(Notification::FriendAccepted {
            friend_id: friend.id,
            friend_name: friend.name.clone(),
            chat_id,
            message: format!("{} accepted your friend request", friend.name),
            timestamp,
        })
    }

    /// Create a friend removed notification
    pub fn friend_removed(friend: &Actor, timestamp: DateTime<Utc>) -> Self {
        RelayEvent::Notification(Notification::FriendRemoved {
            friend_id: friend.id,
            friend_name: friend.name.clone(),
            message: format!("{} removed you as a friend", friend.name),
            timestamp,
        })
    }

    /// Create a session request notification
    pub fn session_request(sender: &Actor, timestamp: DateTime<Utc>) -> Self {
        RelayEvent::Notification(Notification::SessionRequest {
            sender_id: sender.id,
            sender_name: sender.name.clone(),
            message: format!(
                "{} wants to start a new skill-sharing session",
                sender.name
            ),
            timestamp,
        })
    }

    /// Create a post-session feedback prompt
    pub fn session_feedback(sender: &Actor, session_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        RelayEvent::Notification(Notification::SessionFeedback {
            sender_id: sender.id,
            sender_name: sender.name.clone(),
            session_id,
            message: format!(
                "{} ended the session. Please submit your feedback!",
                sender.name
            ),
            timestamp,
        })
    }

    /// Event name as it appears on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            RelayEvent::SessionStarted { .. } => "sessionStarted",
            RelayEvent::SessionEnded { .. } => "sessionEnded",
            RelayEvent::SessionEndedNotification { .. } => "sessionEndedNotification",
            RelayEvent::Notification(_) => "notification",
        }
    }

    /// Notification sub-type, for "notification" events
    pub fn notification_type(&self) -> Option<&'static str> {
        match self {
            RelayEvent::Notification(n) => Some(n.kind()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::FriendRequest { .. } => "friend_request",
            Notification::FriendAccepted { .. } => "friend_accepted",
            Notification::FriendRemoved { .. } => "friend_removed",
            Notification::SessionRequest { .. } => "session_request",
            Notification::SessionFeedback { .. } => "session_feedback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_started_wire_format() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let session = Session::start(a, b, Uuid::now_v7(), 1, Utc::now());
        let event = RelayEvent::session_started(session.clone(), Actor::new(a, "Asha"));

        let json = event.to_json();
        assert_eq!(json["event"], "sessionStarted");
        assert_eq!(json["data"]["session"]["id"], session.id.to_string());
        assert_eq!(json["data"]["started_by"]["name"], "Asha");
        assert_eq!(
            json["data"]["message"],
            "Asha started a skill-sharing session"
        );
    }

    #[test]
    fn test_notification_is_tagged_by_type() {
        let sender = Actor::new(Uuid::now_v7(), "Ben");
        let session_id = Uuid::now_v7();
        let event = RelayEvent::session_feedback(&sender, session_id, Utc::now());

        let json = event.to_json();
        assert_eq!(json["event"], "notification");
        assert_eq!(json["data"]["type"], "session_feedback");
        assert_eq!(json["data"]["session_id"], session_id.to_string());
        assert_eq!(event.notification_type(), Some("session_feedback"));
    }

    #[test]
    fn test_event_type_names() {
        let actor = Actor::new(Uuid::now_v7(), "Cy");
        let event = RelayEvent::session_ended_notification(Uuid::now_v7(), actor, "Di", Utc::now());
        assert_eq!(event.event_type(), "sessionEndedNotification");
        assert_eq!(event.notification_type(), None);
    }

    #[test]
    fn test_relay_event_deserializes() {
        let sender = Actor::new(Uuid::now_v7(), "Ed");
        let event = RelayEvent::session_request(&sender, Utc::now());
        let text = serde_json::to_string(&event).unwrap();
        let parsed: RelayEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, event);
    }
}
