// Storage backend abstraction
// Decision: Use enum dispatch to pick the backend, hand out trait objects to the engine
//
// StorageBackend works with either PostgreSQL (production) or the in-memory
// stores from skillswap-core (dev mode).

use anyhow::Result;
use skillswap_core::memory::{
    InMemoryFeedbackStore, InMemoryFriendshipStore, InMemorySessionStore, InMemoryUserDirectory,
};
use skillswap_core::traits::{FeedbackStore, FriendshipStore, SessionStore, UserDirectory};
use sqlx::PgPool;
use std::sync::Arc;

use crate::feedback_store::DbFeedbackStore;
use crate::friendship_store::{DbFriendshipStore, DbUserDirectory};
use crate::repositories::Database;
use crate::session_store::DbSessionStore;

/// In-memory stores sharing one process lifetime
#[derive(Debug, Default, Clone)]
pub struct InMemoryStores {
    pub sessions: InMemorySessionStore,
    pub friendships: InMemoryFriendshipStore,
    pub users: InMemoryUserDirectory,
    pub feedback: InMemoryFeedbackStore,
}

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory stores (dev mode)
    InMemory(InMemoryStores),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL and run migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        tracing::debug!("Database migrations applied");
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(InMemoryStores::default())
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        match self {
            Self::Postgres(db) => Arc::new(DbSessionStore::new(db.clone())),
            Self::InMemory(stores) => Arc::new(stores.sessions.clone()),
        }
    }

    pub fn friendship_store(&self) -> Arc<dyn FriendshipStore> {
        match self {
            Self::Postgres(db) => Arc::new(DbFriendshipStore::new(db.clone())),
            Self::InMemory(stores) => Arc::new(stores.friendships.clone()),
        }
    }

    pub fn user_directory(&self) -> Arc<dyn UserDirectory> {
        match self {
            Self::Postgres(db) => Arc::new(DbUserDirectory::new(db.clone())),
            Self::InMemory(stores) => Arc::new(stores.users.clone()),
        }
    }

    pub fn feedback_store(&self) -> Arc<dyn FeedbackStore> {
        match self {
            Self::Postgres(db) => Arc::new(DbFeedbackStore::new(db.clone())),
            Self::InMemory(stores) => Arc::new(stores.feedback.clone()),
        }
    }
}
