// Friendship service
//
// At most one FriendRequest exists per pair. A declined or removed request is
// reopened rather than duplicated. Accepting assigns the pair's chat thread.

use skillswap_core::{
    Actor, Clock, EventPublisher, Friend, FriendRequest, FriendRequestStatus, FriendshipStore, RelayEvent,
    Result, SessionError, UserDirectory,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct FriendService {
    friendships: Arc<dyn FriendshipStore>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl FriendService {
    pub fn new(
        friendships: Arc<dyn FriendshipStore>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            friendships,
            users,
            publisher,
            clock,
        }
    }

    /// Send a friend request
    pub async fn send_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequest> {
        if sender_id == receiver_id {
            return Err(SessionError::invalid(
                "Cannot send a friend request to yourself",
            ));
        }
        let sender = self.require_actor(sender_id).await?;
        if self.users.get_user(receiver_id).await?.is_none() {
            return Err(SessionError::not_found("User not found"));
        }

        let now = self.clock.now();
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let request = match self.friendships.find_between(sender_id, receiver_id).await? {
            Some(existing) => match existing.status {
                FriendRequestStatus::Accepted => {
                    return Err(SessionError::conflict("You are already friends with this user"))
                }
                FriendRequestStatus::Pending => {
                    return Err(SessionError::conflict("A friend request is already pending"))
                }
                FriendRequestStatus::Declined | FriendRequestStatus::Removed => {
                    let mut reopened = existing;
                    reopened.reopen(sender_id, receiver_id, message, now);
                    reopened
                }
            },
            None => FriendRequest::new(sender_id, receiver_id, message, now),
        };
        let request = self.friendships.save(request).await?;

        tracing::info!(request_id = %request.id, %sender_id, %receiver_id, "Friend request sent");
        self.publisher
            .publish(receiver_id, &RelayEvent::friend_request(&sender, now));

        Ok(request)
    }

    /// Accept or decline a pending request; only its receiver may respond
    pub async fn respond(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        accept: bool,
    ) -> Result<FriendRequest> {
        let mut request = self
            .friendships
            .get(request_id)
            .await?
            .ok_or_else(|| SessionError::not_found("Friend request not found"))?;

        if request.receiver_id != user_id {
            return Err(SessionError::forbidden(
                "Only the receiver can respond to this request",
            ));
        }
        if request.status != FriendRequestStatus::Pending {
            return Err(SessionError::conflict("Friend request has already been handled"));
        }

        let now = self.clock.now();
        if accept {
            request.respond(FriendRequestStatus::Accepted, now);
            request.chat_id = Some(Uuid::now_v7());
        } else {
            request.respond(FriendRequestStatus::Declined, now);
        }
        let request = self.friendships.save(request).await?;

        tracing::info!(%request_id, status = %request.status, "Friend request answered");
        if let (true, Some(chat_id)) = (accept, request.chat_id) {
            let receiver = self.actor(user_id).await;
            self.publisher.publish(
                request.sender_id,
                &RelayEvent::friend_accepted(&receiver, chat_id, now),
            );
        }

        Ok(request)
    }

    /// End an accepted friendship
    pub async fn remove(&self, user_id: Uuid, friend_id: Uuid) -> Result<FriendRequest> {
        let mut request = self
            .friendships
            .find_between(user_id, friend_id)
            .await?
            .filter(|r| r.is_accepted())
            .ok_or_else(|| SessionError::not_found("Friendship not found"))?;

        let now = self.clock.now();
        request.respond(FriendRequestStatus::Removed, now);
        let request = self.friendships.save(request).await?;

        tracing::info!(%user_id, %friend_id, "Friend removed");
        let remover = self.actor(user_id).await;
        self.publisher
            .publish(friend_id, &RelayEvent::friend_removed(&remover, now));

        Ok(request)
    }

    /// Pending requests received by a user, newest first
    pub async fn pending(&self, user_id: Uuid) -> Result<Vec<FriendRequest>> {
        self.friendships.list_pending_for(user_id).await
    }

    /// Accepted friends with their chat threads, most recent first
    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<Friend>> {
        let accepted = self.friendships.list_accepted_for(user_id).await?;

        let mut friends = Vec::with_capacity(accepted.len());
        for request in accepted {
            let Some(friend_id) = request.counterpart(user_id) else {
                continue;
            };
            match self.users.get_user(friend_id).await? {
                Some(user) => friends.push(Friend {
                    user,
                    chat_id: request.chat_id,
                    friends_since: request.responded_at,
                }),
                None => tracing::warn!(%user_id, %friend_id, "Friend has no profile, skipping"),
            }
        }
        Ok(friends)
    }

    async fn require_actor(&self, user_id: Uuid) -> Result<Actor> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| SessionError::not_found("User not found"))?;
        Ok(Actor::new(user.id, user.name))
    }

    /// Best-effort display identity, used after the write has been applied
    async fn actor(&self, user_id: Uuid) -> Actor {
        match self.users.get_user(user_id).await {
            Ok(Some(user)) => Actor::new(user.id, user.name),
            Ok(None) => Actor::unknown(user_id),
            Err(e) => {
                tracing::warn!(%user_id, "Profile lookup failed, using placeholder name: {}", e);
                Actor::unknown(user_id)
            }
        }
    }
}
