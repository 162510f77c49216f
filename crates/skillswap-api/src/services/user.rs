// User directory service

use skillswap_core::{CreateUser, Result, SessionError, UserDirectory, UserProfile};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    users: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub async fn create(&self, input: CreateUser) -> Result<UserProfile> {
        if input.name.trim().is_empty() {
            return Err(SessionError::invalid("Name is required"));
        }
        let email = input.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(SessionError::invalid("A valid email is required"));
        }
        let user = self.users.create_user(input).await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserProfile> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| SessionError::not_found("User not found"))
    }
}
