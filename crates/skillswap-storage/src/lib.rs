// Postgres storage layer with sqlx
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// This crate provides database implementations for core traits:
// - DbSessionStore: implements SessionStore for session persistence
// - DbFriendshipStore: implements FriendshipStore for friend requests
// - DbUserDirectory: implements UserDirectory for user profiles
// - DbFeedbackStore: implements FeedbackStore for rating records

pub mod backend;
pub mod feedback_store;
pub mod friendship_store;
pub mod models;
pub mod repositories;
pub mod session_store;

pub use backend::{InMemoryStores, StorageBackend};
pub use feedback_store::DbFeedbackStore;
pub use friendship_store::{DbFriendshipStore, DbUserDirectory};
pub use models::*;
pub use repositories::*;
pub use session_store::DbSessionStore;
