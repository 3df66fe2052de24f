//! uis-chat — client for the Dentamind assistant endpoint.
//!
//! The endpoint accepts `{model, max_tokens, system, messages[]}` and
//! returns `{content: [{type, text}, ...]}`. This crate's obligations are
//! narrow: carry the conversation transcript, fold an optional structured
//! data context into the `system` field as human-readable text, concatenate
//! the `text`-typed blocks of the reply in order, and never let a failure
//! crash the conversation — failures render a fixed fallback message.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors from the chat endpoint. Callers of [`ChatClient::ask`] never see
/// these; they exist for diagnostics via [`ChatClient::try_ask`].
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Chat endpoint returned HTTP {code}")]
    Status { code: u16 },
}

/// Fixed user-visible message for any transport or server failure.
pub const CONNECTION_FALLBACK: &str =
    "Connection error. Please check your network and try again.";

/// Fixed reply for a well-formed response that carried no text.
pub const EMPTY_REPLY: &str = "I apologize, I was unable to process that request.";

/// The assistant's standing instructions.
const SYSTEM_PROMPT: &str = "You are Dentamind AI, the intelligent decision brain for dental practices. You are embedded in the UIS Health platform — a unified intelligence system that aggregates data from practice management systems.

You help dental practice owners, office managers, and DSO executives understand their practice performance, identify risks, and make data-driven decisions.

Your capabilities include:
- Analyzing no-show risk patterns and recommending interventions
- Revenue forecasting and identifying revenue leakage
- Patient churn detection and retention strategies
- Schedule optimization and bottleneck identification
- Cross-practice benchmarking for multi-location organizations
- Treatment plan acceptance analysis
- Provider productivity insights

Keep responses concise, actionable, and specific to dental practice operations. Use dental industry terminology naturally. When you don't have specific data, provide frameworks and best practices.

Always be confident but precise. You are the decision brain — not a search engine.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the running conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A structured data block folded into the system field, so the assistant
/// answers against live practice data instead of generalities.
#[derive(Debug, Clone)]
pub struct DataContext {
    pub title: String,
    pub payload: Value,
}

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// Client for the assistant endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Send the transcript and return the assistant's reply.
    ///
    /// Never fails: any transport or server error renders the fixed
    /// fallback message so the conversation view stays alive.
    pub async fn ask(&self, transcript: &[ChatMessage], context: Option<&DataContext>) -> String {
        match self.try_ask(transcript, context).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed, rendering fallback");
                CONNECTION_FALLBACK.to_string()
            }
        }
    }

    /// Like [`ask`](ChatClient::ask), but surfaces the typed error.
    pub async fn try_ask(
        &self,
        transcript: &[ChatMessage],
        context: Option<&DataContext>,
    ) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: build_system(context),
            messages: transcript,
        };

        let response = self
            .http
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                code: status.as_u16(),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(join_text_blocks(completion))
    }
}

/// The standing prompt plus, when supplied, the data context rendered as a
/// titled human-readable section.
fn build_system(context: Option<&DataContext>) -> String {
    match context {
        None => SYSTEM_PROMPT.to_string(),
        Some(ctx) => {
            let rendered = serde_json::to_string_pretty(&ctx.payload)
                .unwrap_or_else(|_| ctx.payload.to_string());
            format!("{SYSTEM_PROMPT}\n\n## {}\n{rendered}", ctx.title)
        }
    }
}

/// Concatenate the `text`-typed blocks in order; everything else is
/// skipped. An empty result becomes the fixed apology.
fn join_text_blocks(completion: CompletionResponse) -> String {
    let parts: Vec<String> = completion
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_without_context_is_just_the_prompt() {
        assert_eq!(build_system(None), SYSTEM_PROMPT);
    }

    #[test]
    fn system_with_context_appends_titled_section() {
        let ctx = DataContext {
            title: "Practice stats".to_string(),
            payload: json!({"activePatients": 412}),
        };
        let system = build_system(Some(&ctx));
        assert!(system.starts_with(SYSTEM_PROMPT));
        assert!(system.contains("## Practice stats"));
        assert!(system.contains("\"activePatients\": 412"));
    }

    #[test]
    fn text_blocks_concatenate_in_order() {
        let completion = CompletionResponse {
            content: vec![
                ContentBlock {
                    kind: "text".to_string(),
                    text: Some("First.".to_string()),
                },
                ContentBlock {
                    kind: "tool_use".to_string(),
                    text: None,
                },
                ContentBlock {
                    kind: "text".to_string(),
                    text: Some("Second.".to_string()),
                },
            ],
        };
        assert_eq!(join_text_blocks(completion), "First.\nSecond.");
    }

    #[test]
    fn empty_content_renders_apology() {
        let completion = CompletionResponse { content: vec![] };
        assert_eq!(join_text_blocks(completion), EMPTY_REPLY);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }
}
