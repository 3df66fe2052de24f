//! Integration tests for the chat client against a mock completion endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uis_chat::{ChatClient, ChatConfig, ChatError, ChatMessage, DataContext, CONNECTION_FALLBACK, EMPTY_REPLY};

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(ChatConfig {
        url: format!("{}/api/chat", server.uri()),
        model: "claude-sonnet-4-20250514".to_string(),
        max_tokens: 1000,
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn reply_concatenates_text_blocks_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "No-show risk is concentrated on Mondays."},
                {"type": "thinking", "text": "ignored"},
                {"type": "text", "text": "Consider reminder calls 48h ahead."}
            ]
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .ask(&[ChatMessage::user("How can I reduce no-shows?")], None)
        .await;

    assert_eq!(
        reply,
        "No-show risk is concentrated on Mondays.\nConsider reminder calls 48h ahead."
    );
}

#[tokio::test]
async fn request_carries_model_transcript_and_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 1000,
            "messages": [
                {"role": "user", "content": "What are my biggest risks this week?"},
                {"role": "assistant", "content": "Mostly hygiene no-shows."},
                {"role": "user", "content": "And revenue?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Flat month over month."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transcript = vec![
        ChatMessage::user("What are my biggest risks this week?"),
        ChatMessage::assistant("Mostly hygiene no-shows."),
        ChatMessage::user("And revenue?"),
    ];
    let context = DataContext {
        title: "Practice stats".to_string(),
        payload: json!({"totalRevenue": 81250.0}),
    };

    let reply = client_for(&server).ask(&transcript, Some(&context)).await;
    assert_eq!(reply, "Flat month over month.");

    // The context block rides in the system field as readable text.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["system"].as_str().unwrap();
    assert!(system.contains("Dentamind AI"));
    assert!(system.contains("## Practice stats"));
    assert!(system.contains("totalRevenue"));
}

#[tokio::test]
async fn server_failure_renders_fixed_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = client.ask(&[ChatMessage::user("hi")], None).await;
    assert_eq!(reply, CONNECTION_FALLBACK);

    // The typed error is still observable for diagnostics.
    let err = client.try_ask(&[ChatMessage::user("hi")], None).await.unwrap_err();
    assert!(matches!(err, ChatError::Status { code: 502 }));
}

#[tokio::test]
async fn unreachable_endpoint_renders_fixed_fallback() {
    // Port from a server that has already shut down.
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let reply = client.ask(&[ChatMessage::user("hi")], None).await;
    assert_eq!(reply, CONNECTION_FALLBACK);
}

#[tokio::test]
async fn textless_response_renders_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "tool_use"}]
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server).ask(&[ChatMessage::user("hi")], None).await;
    assert_eq!(reply, EMPTY_REPLY);
}
