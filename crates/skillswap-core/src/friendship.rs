// Friendship domain types
//
// The engine only asks one question of friendships: is there an accepted
// relation between two users, in either direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::user::UserProfile;

/// Friend request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
    Removed,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Declined => "declined",
            FriendRequestStatus::Removed => "removed",
        }
    }
}

impl std::fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FriendRequestStatus {
    fn from(s: &str) -> Self {
        match s {
            "accepted" => FriendRequestStatus::Accepted,
            "declined" => FriendRequestStatus::Declined,
            "removed" => FriendRequestStatus::Removed,
            _ => FriendRequestStatus::Pending,
        }
    }
}

/// FriendRequest - at most one per unordered pair of users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FriendRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Chat thread created when the request was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id,
            status: FriendRequestStatus::Pending,
            message,
            chat_id: None,
            created_at: now,
            responded_at: None,
        }
    }

    pub fn involves(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == FriendRequestStatus::Accepted
    }

    /// Turn a declined or removed request back into a fresh pending one
    pub fn reopen(
        &mut self,
        sender_id: Uuid,
        receiver_id: Uuid,
        message: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.sender_id = sender_id;
        self.receiver_id = receiver_id;
        self.status = FriendRequestStatus::Pending;
        self.message = message;
        self.chat_id = None;
        self.created_at = now;
        self.responded_at = None;
    }

    pub fn respond(&mut self, status: FriendRequestStatus, now: DateTime<Utc>) {
        self.status = status;
        self.responded_at = Some(now);
    }

    /// The other side of the request, if `user_id` is on it
    pub fn counterpart(&self, user_id: Uuid) -> Option<Uuid> {
        if self.sender_id == user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }
}

/// An accepted friend as seen by one user, with the pair's chat thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Friend {
    pub user: UserProfile,
    /// Chat thread to pass when starting a session with this friend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friends_since: Option<DateTime<Utc>>,
}
