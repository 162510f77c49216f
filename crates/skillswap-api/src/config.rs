// Server configuration from environment variables
//
// - DATABASE_URL: Postgres connection string; unset runs on in-memory stores
// - BIND_ADDR: listen address (default: 0.0.0.0:5000)
// - API_PREFIX: optional prefix for API routes, e.g. "/api" → /api/v1/sessions
// - CORS_ALLOWED_ORIGINS: comma-separated origins; unset means same-origin only
// - MAX_SESSIONS_PER_PAIR / REQUIRE_FEEDBACK_BEFORE_NEXT_SESSION: see EngineConfig

use axum::http::HeaderValue;
use skillswap_core::EngineConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub api_prefix: String,
    pub cors_origins: Vec<HeaderValue>,
    pub engine: EngineConfig,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let api_prefix = normalize_prefix(&std::env::var("API_PREFIX").unwrap_or_default());
        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        Self {
            database_url,
            bind_addr,
            api_prefix,
            cors_origins,
            engine: EngineConfig::from_env(),
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }
}

/// Parse a comma-separated origin list, skipping entries that are not valid header values
pub fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// "" stays empty; "api/" becomes "/api"
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("https://a.campus.edu, https://b.campus.edu,,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://b.campus.edu");
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/api"), "/api");
    }
}
