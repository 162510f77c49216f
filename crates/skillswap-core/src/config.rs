// Engine configuration
//
// EngineConfig can be:
// - Created directly (Default matches production rules)
// - Loaded from environment variables via `from_env`

use serde::{Deserialize, Serialize};

/// Sessions a pair may complete before new sessions are refused
pub const DEFAULT_MAX_SESSIONS_PER_PAIR: u32 = 5;

/// Configuration for the session engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Maximum completed sessions per pair
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_pair: u32,

    /// Refuse to start a new session until the requester has recorded
    /// feedback on the pair's previous session
    #[serde(default)]
    pub require_feedback_before_next_session: bool,
}

fn default_max_sessions() -> u32 {
    DEFAULT_MAX_SESSIONS_PER_PAIR
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// - MAX_SESSIONS_PER_PAIR (default: 5)
    /// - REQUIRE_FEEDBACK_BEFORE_NEXT_SESSION (default: false)
    pub fn from_env() -> Self {
        let max_sessions_per_pair = std::env::var("MAX_SESSIONS_PER_PAIR")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|v: &u32| *v > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS_PER_PAIR);

        let require_feedback_before_next_session =
            std::env::var("REQUIRE_FEEDBACK_BEFORE_NEXT_SESSION")
                .map(|v| parse_flag(&v))
                .unwrap_or(false);

        Self {
            max_sessions_per_pair,
            require_feedback_before_next_session,
        }
    }

    /// Set the per-pair session cap
    pub fn with_max_sessions_per_pair(mut self, max: u32) -> Self {
        self.max_sessions_per_pair = max;
        self
    }

    /// Enable or disable the feedback-before-next-session rule
    pub fn with_required_feedback(mut self, required: bool) -> Self {
        self.require_feedback_before_next_session = required;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_pair: DEFAULT_MAX_SESSIONS_PER_PAIR,
            require_feedback_before_next_session: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
