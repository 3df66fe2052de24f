//! Configuration management for the UIS client.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`UIS` prefix, `__` separator, e.g. `UIS__API__GRAPHQL_URL`)
//! 2. Config file (`uis.toml`, `[api]` section)
//! 3. Defaults (the public demo endpoints)

use serde::Deserialize;

use crate::error::UisError;

/// Endpoint and client configuration.
///
/// Every field has a default so a bare environment still produces a working
/// client pointed at the demo deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// GraphQL endpoint for all dashboard data operations.
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Chat/completion endpoint for the assistant.
    #[serde(default = "default_chat_url")]
    pub chat_url: String,

    /// Model identifier forwarded in chat requests.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Token cap forwarded in chat requests.
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,

    /// Per-request timeout in seconds for both endpoints.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory for durable client state (session vault).
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

fn default_graphql_url() -> String {
    "https://uis-api-demo.kindwater-f937fbe0.eastus.azurecontainerapps.io/graphql".to_string()
}

fn default_chat_url() -> String {
    "https://api.uishealth.com/api/chat".to_string()
}

fn default_chat_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_chat_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_state_dir() -> String {
    "./.uis".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            chat_url: default_chat_url(),
            chat_model: default_chat_model(),
            chat_max_tokens: default_chat_max_tokens(),
            request_timeout_secs: default_timeout_secs(),
            state_dir: default_state_dir(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) layered under
    /// `UIS__*` environment variables.
    ///
    /// A missing file and empty environment yield pure defaults. A present
    /// but malformed `[api]` section is a configuration error, not a silent
    /// fallback.
    pub fn load(file_prefix: &str) -> Result<Self, UisError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("UIS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| UisError::Config(e.to_string()))?;

        if cfg.get_table("api").is_err() {
            tracing::debug!("No [api] configuration found, using defaults");
            return Ok(Self::default());
        }

        cfg.get::<ApiConfig>("api")
            .map_err(|e| UisError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_demo_endpoints() {
        let config = ApiConfig::default();
        assert!(config.graphql_url.ends_with("/graphql"));
        assert_eq!(config.chat_url, "https://api.uishealth.com/api/chat");
        assert_eq!(config.chat_max_tokens, 1000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = ApiConfig::load("uis-test-missing").unwrap();
        assert_eq!(config.graphql_url, ApiConfig::default().graphql_url);
    }
}
