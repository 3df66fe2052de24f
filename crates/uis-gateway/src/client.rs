//! HTTP transport to the GraphQL endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use uis_core::TokenSource;

/// Errors from gateway operations.
///
/// Everything the network or the server can do wrong arrives here as a
/// typed value — nothing is thrown across the component boundary uncaught.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Network-level failure reaching the endpoint.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the endpoint.
    #[error("Server returned HTTP {code}")]
    Status { code: u16 },

    /// The server executed the request but reported GraphQL errors.
    #[error("GraphQL errors: {}", messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// A well-formed response with neither data nor errors.
    #[error("Response carried no data")]
    MissingData,

    /// A response field did not match its typed schema.
    #[error("Failed to decode {field}: {message}")]
    Decode { field: String, message: String },
}

/// Configuration for the gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "https://uis-api-demo.kindwater-f937fbe0.eastus.azurecontainerapps.io/graphql"
                .to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// The single configured channel to the GraphQL endpoint.
///
/// Clone is cheap (inner Arc / pooled HTTP client). The bearer credential
/// is read from the [`TokenSource`] at request time, not at construction
/// time, so logout and token rotation are honored on the very next request.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
    tokens: Arc<dyn TokenSource>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Execute one GraphQL operation and return its `data` payload.
    ///
    /// Absent a token the request is sent without the bearer credential
    /// rather than blocked; authorization is the server's concern.
    pub async fn execute(
        &self,
        operation_name: &str,
        document: &str,
        variables: &Value,
    ) -> Result<Value, GatewayError> {
        let body = GraphqlRequest {
            query: document,
            operation_name,
            variables,
        };

        let mut request = self.http.post(&self.config.url).json(&body);
        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer_auth(token);
        }

        tracing::debug!(operation = operation_name, "GraphQL request");

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(operation = operation_name, code = status.as_u16(), "GraphQL request rejected");
            return Err(GatewayError::Status {
                code: status.as_u16(),
            });
        }

        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                tracing::warn!(operation = operation_name, errors = ?messages, "GraphQL errors");
                return Err(GatewayError::Graphql { messages });
            }
        }

        envelope.data.ok_or(GatewayError::MissingData)
    }
}
