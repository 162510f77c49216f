// Campus Skill Swap API
//
// HTTP and WebSocket binding for the session engine. The binary in main.rs only
// reads configuration and serves the router built here.

pub mod api;
pub mod app;
pub mod config;
pub mod identity;
pub mod openapi;
pub mod relay;
pub mod services;

pub use app::{build_app, AppServices};
pub use config::ApiConfig;
