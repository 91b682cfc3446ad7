//! Integration tests for the chat-completions narration client

use serde_json::json;
use signalcast::error::NarrationError;
use signalcast::models::{IndicatorSnapshot, Timeframe, TimeframeAnalysis};
use signalcast::services::narration::{ChatCompletionClient, NarrationRequest, NarrationService};
use signalcast::services::tradingview::summary_from_row;
use signalcast::signals::decision::decide_snapshot;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{chat_completion, scanner_row};

fn request() -> NarrationRequest {
    let row = scanner_row();
    let values = row["data"][0]["d"].as_array().unwrap().clone();
    let summary = summary_from_row(&values).unwrap();
    let snapshot = IndicatorSnapshot::from_summary("BTCUSDT", Timeframe::H1, &summary);
    let decision = decide_snapshot(&snapshot);
    NarrationRequest::short_comment(TimeframeAnalysis { snapshot, decision })
}

fn client(server: &MockServer) -> ChatCompletionClient {
    ChatCompletionClient::new(
        format!("{}/v1", server.uri()),
        Some("secret-key".to_string()),
        "test-model",
    )
}

#[tokio::test]
async fn sends_authenticated_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "temperature": 0.5,
            "max_tokens": 200
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("  Buyers in control.  ")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).generate(&request()).await.unwrap();
    assert_eq!(text, "Buyers in control.");
}

#[tokio::test]
async fn quota_response_is_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "insufficient_quota" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err, NarrationError::QuotaExceeded("Rate limit reached".to_string()));
}

#[tokio::test]
async fn rejected_key_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API key provided" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err, NarrationError::Unauthorized("Invalid API key provided".to_string()));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn empty_choices_are_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err, NarrationError::EmptyResponse);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).generate(&request()).await.unwrap_err();
    assert!(matches!(err, NarrationError::Decode(_)));
}
