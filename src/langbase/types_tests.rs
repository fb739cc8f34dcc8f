//! Unit tests for Langbase API types.

use super::*;
use serde_json::json;

#[test]
fn test_message_roles_serialize_lowercase() {
    let value = serde_json::to_value(vec![
        Message::system("You are a fact checker"),
        Message::user("Analyze this"),
    ])
    .unwrap();

    assert_eq!(value[0]["role"], "system");
    assert_eq!(value[0]["content"], "You are a fact checker");
    assert_eq!(value[1]["role"], "user");
}

#[test]
fn test_pipe_request_defaults() {
    let req = PipeRequest::new("truthlens-bias-v1", vec![Message::user("test")]);
    let value = serde_json::to_value(&req).unwrap();

    assert_eq!(value["name"], "truthlens-bias-v1");
    assert_eq!(value["stream"], false);
    assert!(value.get("variables").is_none());
}

#[test]
fn test_pipe_request_variables_accumulate() {
    let req = PipeRequest::new("test", vec![])
        .with_variable("language", "en")
        .with_variable("language", "ru")
        .with_variable("tier", "combined");

    let vars = req.variables.unwrap();
    assert_eq!(vars.len(), 2);
    assert_eq!(vars["language"], "ru");
}

#[test]
fn test_pipe_response_token_usage() {
    let response: PipeResponse = serde_json::from_value(json!({
        "success": true,
        "completion": "{\"bias_score\": 12}",
        "threadId": "thread-1",
        "raw": {
            "model": "gpt-4o-mini",
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }
    }))
    .unwrap();

    assert!(response.success);
    assert_eq!(response.thread_id.as_deref(), Some("thread-1"));
    assert_eq!(response.total_tokens(), Some(15));
}

#[test]
fn test_pipe_response_minimal() {
    let response: PipeResponse = serde_json::from_value(json!({
        "success": false,
        "completion": ""
    }))
    .unwrap();

    assert!(!response.success);
    assert!(response.thread_id.is_none());
    assert_eq!(response.total_tokens(), None);
}

#[test]
fn test_json_analysis_pipe_definition() {
    let def = PipeDefinition::json_analysis(
        "truthlens-combined-v1",
        "Combined trust analysis",
        "rubric",
    );
    let value = serde_json::to_value(&def).unwrap();

    assert_eq!(value["name"], "truthlens-combined-v1");
    assert_eq!(value["model"], PIPE_MODEL);
    assert_eq!(value["upsert"], true);
    assert_eq!(value["json"], true);
    assert_eq!(value["temperature"], 0.3);
    assert_eq!(value["max_tokens"], 1000);
    assert_eq!(value["messages"], json!([{ "role": "system", "content": "rubric" }]));
}

#[test]
fn test_pipe_created_tolerates_extra_fields() {
    let created: PipeCreated = serde_json::from_value(json!({
        "name": "truthlens-bias-v1",
        "description": null,
        "status": "private",
        "url": "https://langbase.com/acme/truthlens-bias-v1",
        "owner_login": "acme"
    }))
    .unwrap();

    assert_eq!(created.name, "truthlens-bias-v1");
    assert_eq!(created.status.as_deref(), Some("private"));
}
