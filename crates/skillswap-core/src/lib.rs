// Skill Session Coordination
//
// This crate provides a DB-agnostic implementation of the skill-sharing session
// protocol between two friends (start → end → feedback).
//
// Key design decisions:
// - Uses traits (SessionStore, FriendshipStore, UserDirectory, EventPublisher) for pluggable backends
// - The engine is a stateless request handler; all state lives in the stores
// - An unordered pair of users is always addressed through a canonical PairKey
// - Peer notifications are a tagged union (RelayEvent) delivered best-effort
// - Feedback completion is exposed as data on the session, enforcement is opt-in via EngineConfig

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod feedback;
pub mod friendship;
pub mod pair;
pub mod session;
pub mod traits;
pub mod user;

// In-memory implementations for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::{EndedSession, SessionEngine, SessionStats};
pub use error::{Result, SessionError};
pub use events::{Actor, Notification, RelayEvent};
pub use feedback::{
    CategorySummary, CreateFeedback, Feedback, FeedbackSummary, RatingStats, SessionType,
};
pub use friendship::{Friend, FriendRequest, FriendRequestStatus};
pub use pair::PairKey;
pub use session::{FeedbackLink, Session, SessionStatus};
pub use traits::{
    Clock, EventPublisher, FeedbackStore, FriendshipStore, SessionStore, SystemClock,
    UserDirectory,
};
pub use user::{CreateUser, UserProfile};
