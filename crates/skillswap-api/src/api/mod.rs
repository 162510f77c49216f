// HTTP API routes
//
// Each submodule handles a specific resource type with its own AppState.

pub mod common;
pub mod feedback;
pub mod friends;
pub mod sessions;
pub mod users;
pub mod ws;

// Re-export common types
pub use common::{ApiError, ErrorResponse, ListResponse, MessageResponse};
