//! Integration tests for the OpenAI-compatible chat completions provider.

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use mcp_truthlens::analysis::Language;
use mcp_truthlens::config::{ChatConfig, RequestConfig};
use mcp_truthlens::error::AnalysisError;
use mcp_truthlens::provider::{ChatCompletionsProvider, SignalProvider};

fn create_provider(base_url: &str) -> ChatCompletionsProvider {
    let config = ChatConfig {
        api_key: "chat-key".to_string(),
        base_url: format!("{}/", base_url),
        model: "deepseek-chat".to_string(),
    };
    ChatCompletionsProvider::new(&config, &RequestConfig::default())
        .expect("Failed to create provider")
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::test]
async fn test_name_is_model() {
    let provider = create_provider("http://localhost:1");
    assert_eq!(provider.name(), "deepseek-chat");
}

#[tokio::test]
async fn test_combined_request_shape_and_parse() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer chat-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "temperature": 0.3,
            "max_tokens": 1000,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(chat_reply(
            "{\"reliability_score\": 82, \"bias_score\": 20, \"sentiment_score\": 10, \
             \"category\": \"reliable\", \"positive_points\": [\"Cites a university\"], \
             \"recommendations\": [\"Read the study\"], \"confidence_level\": 85, \
             \"sources\": [\"Stanford University\"]}",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = create_provider(&mock_server.uri())
        .combined("Stanford study shows 15% drop", Language::En)
        .await
        .unwrap();

    assert_eq!(payload.reliability_score, 82.0);
    assert_eq!(payload.category, "reliable");
    assert_eq!(
        payload.sources,
        Some(vec!["Stanford University".to_string()])
    );
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&mock_server)
        .await;

    let err = create_provider(&mock_server.uri())
        .bias("text")
        .await
        .unwrap_err();

    match err {
        AnalysisError::ProviderUnavailable { message } => {
            assert!(message.contains("500"));
            assert!(message.contains("internal"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let err = create_provider(&mock_server.uri())
        .factuality("text")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_wrong_shape_content_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("{\"score\": \"very biased\"}"))
        .mount(&mock_server)
        .await;

    let err = create_provider(&mock_server.uri())
        .bias("text")
        .await
        .unwrap_err();
    assert!(err.is_contract_drift());
}

#[tokio::test]
async fn test_sentiment_signal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("{\"label\": \"POSITIVE\", \"score\": 0.75}"))
        .mount(&mock_server)
        .await;

    let sentiment = create_provider(&mock_server.uri())
        .sentiment("Great news for everyone", Language::En)
        .await
        .unwrap();
    assert_eq!(sentiment.label, "POSITIVE");
    assert_eq!(sentiment.signed_score().unwrap(), 75.0);
}
