//! Integration tests for the full MCP → controller → provider → storage flow
//!
//! These tests drive the degradation controller against a mocked Langbase
//! API and verify which tier produced each result, and that results land in
//! the history store.

use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use mcp_truthlens::analysis::{
    Category, DegradationController, HeuristicScorer, Language, HEURISTIC_MODEL,
};
use mcp_truthlens::config::{
    AnalysisConfig, Config, DatabaseConfig, LangbaseConfig, LogFormat, LoggingConfig, PipeConfig,
    ProviderConfig, RequestConfig, StorageBackend,
};
use mcp_truthlens::langbase::LangbaseClient;
use mcp_truthlens::provider::LangbaseProvider;
use mcp_truthlens::server::{handle_tool_call, AppState, SharedState};
use mcp_truthlens::storage::{AnalysisStore, SqliteStorage};

/// Create test configuration with mock server URL
fn create_test_config(mock_url: &str, db_path: std::path::PathBuf) -> Config {
    Config {
        provider: ProviderConfig::Langbase(LangbaseConfig {
            api_key: "test-api-key".to_string(),
            base_url: mock_url.to_string(),
        }),
        database: DatabaseConfig {
            backend: StorageBackend::Sqlite,
            path: db_path,
            max_connections: 1,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        },
        request: RequestConfig {
            timeout_ms: 5000,
            max_retries: 0,
            retry_delay_ms: 100,
        },
        pipes: PipeConfig::default(),
        analysis: AnalysisConfig {
            tier_timeout_ms: 5000,
            ..AnalysisConfig::default()
        },
    }
}

/// Build application state wired to the mock server and a temp database
async fn create_state(mock_url: &str, db_path: std::path::PathBuf) -> SharedState {
    let config = create_test_config(mock_url, db_path);

    let langbase = match &config.provider {
        ProviderConfig::Langbase(lb) => lb.clone(),
        _ => unreachable!(),
    };
    let client = LangbaseClient::new(&langbase, config.request.clone()).unwrap();
    let provider = LangbaseProvider::new(client, config.pipes.clone());
    let controller = DegradationController::new(
        Arc::new(provider),
        HeuristicScorer::new(),
        config.analysis.clone(),
    );

    let store: Arc<dyn AnalysisStore> =
        Arc::new(SqliteStorage::new(&config.database).await.unwrap());

    Arc::new(AppState::new(config, store, controller))
}

/// Mock response helpers
fn completion(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "completion": body.to_string(),
        "threadId": "thread-123"
    }))
}

async fn mount_pipe(server: &MockServer, pipe: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({ "name": pipe })))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_combined_tier_result_is_persisted() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    mount_pipe(
        &mock_server,
        "truthlens-combined-v1",
        completion(json!({
            "reliability_score": 85,
            "bias_score": 20,
            "sentiment_score": 15,
            "category": "reliable",
            "positive_points": ["Names a research institution"],
            "warning_points": [],
            "recommendations": ["Read the original study"],
            "confidence_level": 80,
            "sources": ["Stanford University"]
        })),
    )
    .await;

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    let completed = state
        .analyze(
            "New study by Stanford University shows 15% reduction in air pollution",
            Language::En,
        )
        .await
        .unwrap();

    let result = &completed.result;
    assert_eq!(result.reliability_score, 85.0);
    assert_eq!(result.category, Category::Reliable);
    assert_eq!(result.analysis.model, "Combined LLM Analysis (langbase)");
    assert_eq!(
        result.analysis.sources,
        Some(vec!["Stanford University".to_string()])
    );

    completed.persisted.await.unwrap();

    let recent = state.store.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].result.category, Category::Reliable);
    assert_eq!(recent[0].result.reliability_score, 85.0);
    assert_eq!(
        recent[0].result.analysis.model,
        "Combined LLM Analysis (langbase)"
    );
}

#[tokio::test]
async fn test_out_of_range_combined_falls_to_decomposed() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    mount_pipe(
        &mock_server,
        "truthlens-combined-v1",
        completion(json!({
            "reliability_score": 150,
            "bias_score": 20,
            "sentiment_score": 0,
            "category": "reliable",
            "confidence_level": 80
        })),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-sentiment-v1",
        completion(json!({ "label": "NEUTRAL", "score": 0.5 })),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-bias-v1",
        completion(json!({ "bias_score": 10, "bias_indicators": [] })),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-factuality-v1",
        completion(json!({ "factuality_score": 80 })),
    )
    .await;

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    let result = state
        .analyze("The council approved the budget on Monday.", Language::En)
        .await
        .unwrap()
        .result;

    // 80*0.5 + (100-10)*0.3 + 100*0.2
    assert_eq!(result.reliability_score, 87.0);
    assert_eq!(result.bias_score, 10.0);
    assert_eq!(result.sentiment_score, 0.0);
    assert_eq!(result.category, Category::Reliable);
    assert_eq!(result.analysis.model, "Decomposed Signal Fusion (langbase)");
    assert!(result.is_within_bounds());
}

#[tokio::test]
async fn test_one_failed_signal_falls_to_heuristic() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    mount_pipe(
        &mock_server,
        "truthlens-combined-v1",
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-sentiment-v1",
        completion(json!({ "label": "NEGATIVE", "score": 0.5 })),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-bias-v1",
        completion(json!({ "bias_score": 40 })),
    )
    .await;
    mount_pipe(
        &mock_server,
        "truthlens-factuality-v1",
        ResponseTemplate::new(503),
    )
    .await;

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    let result = state
        .analyze("The council approved the budget on Monday.", Language::En)
        .await
        .unwrap()
        .result;

    assert_eq!(result.analysis.model, HEURISTIC_MODEL);
    assert!(result.is_within_bounds());
}

#[tokio::test]
async fn test_provider_down_uses_heuristic_via_tool_call() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .mount(&mock_server)
        .await;

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    let value = handle_tool_call(
        &state,
        "truthlens_analyze",
        Some(json!({
            "content": "Doctors don't want you to know about this natural cure that fixes everything!"
        })),
    )
    .await
    .unwrap();

    assert_eq!(value["category"], "misinformation");
    assert_eq!(value["analysis"]["model"], HEURISTIC_MODEL);
}

#[tokio::test]
async fn test_russian_request_passes_language_variable() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/pipes/run"))
        .and(body_partial_json(json!({
            "name": "truthlens-combined-v1",
            "variables": { "language": "ru" }
        })))
        .respond_with(completion(json!({
            "reliability_score": 25,
            "bias_score": 80,
            "sentiment_score": -70,
            "category": "misinformation",
            "warning_points": ["Нет ссылок на источники"],
            "recommendations": [],
            "confidence_level": 75
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    let result = state
        .analyze("Врачи скрывают правду о чудо-лекарстве!", Language::Ru)
        .await
        .unwrap()
        .result;

    assert_eq!(result.category, Category::Misinformation);
    // Empty provider recommendations are backfilled
    assert!(!result.analysis.recommendations.is_empty());
    assert!(result.analysis.recommendations[0]
        .chars()
        .any(|c| ('а'..='я').contains(&c)));
}

#[tokio::test]
async fn test_blank_content_is_rejected_and_not_stored() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();

    let state = create_state(&mock_server.uri(), dir.path().join("test.db")).await;
    assert!(state.analyze("   ", Language::En).await.is_err());
    assert!(state.store.recent(10).await.unwrap().is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
