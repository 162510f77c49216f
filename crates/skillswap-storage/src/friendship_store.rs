// Database-backed FriendshipStore and UserDirectory implementations

use async_trait::async_trait;
use skillswap_core::{
    traits::{FriendshipStore, UserDirectory},
    CreateUser, FriendRequest, PairKey, Result, SessionError, UserProfile,
};
use uuid::Uuid;

use crate::models::CreateUserRow;
use crate::repositories::Database;

// ============================================================================
// DbFriendshipStore
// ============================================================================

#[derive(Clone)]
pub struct DbFriendshipStore {
    db: Database,
}

impl DbFriendshipStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FriendshipStore for DbFriendshipStore {
    async fn get(&self, request_id: Uuid) -> Result<Option<FriendRequest>> {
        let row = self
            .db
            .get_friend_request(request_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(row.map(FriendRequest::from))
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Option<FriendRequest>> {
        let pair = PairKey::new(a, b)?;
        let row = self
            .db
            .find_friend_request(&pair)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(row.map(FriendRequest::from))
    }

    async fn save(&self, request: FriendRequest) -> Result<FriendRequest> {
        let pair = PairKey::new(request.sender_id, request.receiver_id)?;
        let row = self
            .db
            .upsert_friend_request(&request, &pair)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(row.into())
    }

    async fn list_pending_for(&self, receiver_id: Uuid) -> Result<Vec<FriendRequest>> {
        let rows = self
            .db
            .list_pending_friend_requests(receiver_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(rows.into_iter().map(FriendRequest::from).collect())
    }

    async fn list_accepted_for(&self, user_id: Uuid) -> Result<Vec<FriendRequest>> {
        let rows = self
            .db
            .list_accepted_friend_requests(user_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(rows.into_iter().map(FriendRequest::from).collect())
    }
}

// ============================================================================
// DbUserDirectory
// ============================================================================

#[derive(Clone)]
pub struct DbUserDirectory {
    db: Database,
}

impl DbUserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for DbUserDirectory {
    async fn create_user(&self, input: CreateUser) -> Result<UserProfile> {
        let row = CreateUserRow {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            student_id: input.student_id,
        };
        self.db
            .create_user(row)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?
            .map(UserProfile::from)
            .ok_or_else(|| SessionError::conflict("Email is already registered"))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let row = self
            .db
            .get_user(user_id)
            .await
            .map_err(|e| SessionError::store(e.to_string()))?;
        Ok(row.map(UserProfile::from))
    }
}
