use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::SharedState;
use crate::analysis::{AnalysisResult, Language};
use crate::error::{AnalysisError, AppError, McpError, McpResult, StorageError, ToolError};
use crate::storage::AnalysisRecord;

/// Upper bound on `limit` for history queries.
pub const MAX_RECENT_LIMIT: usize = 100;

/// Parameters for `truthlens_analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeParams {
    /// Text to assess.
    pub content: String,
    /// Language tag; unknown tags fall back to English.
    #[serde(default)]
    pub language: Option<String>,
}

/// Parameters for `truthlens_recent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentParams {
    /// Maximum records to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for `truthlens_get`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetParams {
    /// Record identifier.
    pub id: i64,
}

/// Response of `truthlens_recent`.
#[derive(Debug, Serialize)]
pub struct RecentResponse {
    /// Number of records returned.
    pub count: usize,
    /// Records, most recent first.
    pub analyses: Vec<AnalysisRecord>,
}

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "truthlens_analyze" => handle_analyze(state, arguments).await,
        "truthlens_recent" => handle_recent(state, arguments).await,
        "truthlens_get" => handle_get(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Handle truthlens_analyze tool call
async fn handle_analyze(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    const TOOL: &str = "truthlens_analyze";
    let params: AnalyzeParams = parse_arguments(TOOL, arguments)?;
    let language = params
        .language
        .as_deref()
        .map(Language::from_tag)
        .unwrap_or_default();

    match state.analyze(&params.content, language).await {
        // Persistence continues in the background
        Ok(completed) => to_json(&completed.result),
        Err(AnalysisError::EmptyInput) => Err(McpError::InvalidParameters {
            tool_name: TOOL.to_string(),
            message: AnalysisError::EmptyInput.to_string(),
        }),
        Err(e) => Err(AppError::from(e).into()),
    }
}

/// Handle truthlens_recent tool call
async fn handle_recent(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler(
        "truthlens_recent",
        Some(arguments.unwrap_or_else(|| Value::Object(Default::default()))),
        |params: RecentParams| async move {
            let limit = resolve_limit(
                params.limit,
                state.config.analysis.recent_default_limit,
            )?;
            let analyses = state.store.recent(limit).await?;
            Ok::<_, AppError>(RecentResponse {
                count: analyses.len(),
                analyses,
            })
        },
    )
    .await
}

/// Handle truthlens_get tool call
async fn handle_get(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler("truthlens_get", arguments, |params: GetParams| async move {
        state
            .store
            .get(params.id)
            .await?
            .ok_or(StorageError::RecordNotFound { id: params.id })
    })
    .await
}

/// Validate a requested history size; an absent one falls back to
/// `default`, clamped to `1..=MAX_RECENT_LIMIT`.
pub fn resolve_limit(requested: Option<usize>, default: usize) -> Result<usize, ToolError> {
    match requested {
        None => Ok(default.clamp(1, MAX_RECENT_LIMIT)),
        Some(0) => Err(ToolError::Validation {
            field: "limit".to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Some(n) if n > MAX_RECENT_LIMIT => Err(ToolError::Validation {
            field: "limit".to_string(),
            reason: format!("must be at most {}", MAX_RECENT_LIMIT),
        }),
        Some(n) => Ok(n),
    }
}

fn to_json(result: &AnalysisResult) -> McpResult<Value> {
    serde_json::to_value(result).map_err(McpError::Json)
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

/// Generic handler that executes an operation with consistent error handling.
///
/// Parses typed arguments, maps the operation's error into
/// [`McpError::ExecutionFailed`] and serializes the result.
async fn execute_handler<P, R, E, F, Fut>(
    tool_name: &str,
    arguments: Option<Value>,
    operation: F,
) -> McpResult<Value>
where
    P: serde::de::DeserializeOwned,
    R: Serialize,
    E: std::fmt::Display,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, E>>,
{
    let params: P = parse_arguments(tool_name, arguments)?;

    let result = operation(params)
        .await
        .map_err(|e| McpError::ExecutionFailed {
            message: e.to_string(),
        })?;

    serde_json::to_value(result).map_err(McpError::Json)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::offline_state;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments_missing_arguments() {
        let result: McpResult<AnalyzeParams> = parse_arguments("test.tool", None);
        let err = result.unwrap_err();
        assert!(matches!(err, McpError::InvalidParameters { .. }));
        assert!(err.to_string().contains("Missing arguments"));
        assert!(err.to_string().contains("test.tool"));
    }

    #[test]
    fn test_parse_arguments_wrong_type() {
        let result: McpResult<GetParams> =
            parse_arguments("truthlens_get", Some(json!({ "id": "seven" })));
        assert!(matches!(result, Err(McpError::InvalidParameters { .. })));
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 10).unwrap(), 10);
        assert_eq!(resolve_limit(None, 0).unwrap(), 1);
        assert_eq!(resolve_limit(Some(25), 10).unwrap(), 25);
        assert!(resolve_limit(Some(0), 10).is_err());
        assert!(resolve_limit(Some(MAX_RECENT_LIMIT + 1), 10).is_err());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let state = offline_state();
        let err = handle_tool_call(&state, "truthlens_delete", None)
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::UnknownTool { .. }));
    }

    #[tokio::test]
    async fn test_analyze_returns_camel_case_result() {
        let state = offline_state();
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
        assert!(value["biasScore"].as_f64().unwrap() >= 70.0);
        assert_eq!(
            value["analysis"]["model"],
            "Advanced Pattern Analysis (Fallback)"
        );
    }

    #[tokio::test]
    async fn test_analyze_honours_language() {
        let state = offline_state();
        let value = handle_tool_call(
            &state,
            "truthlens_analyze",
            Some(json!({ "content": "Обычный день в городе.", "language": "ru" })),
        )
        .await
        .unwrap();

        let recommendations = value["analysis"]["recommendations"].as_array().unwrap();
        assert!(!recommendations.is_empty());
        assert!(recommendations[0]
            .as_str()
            .unwrap()
            .chars()
            .any(|c| ('а'..='я').contains(&c)));
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_content() {
        let state = offline_state();
        let err = handle_tool_call(
            &state,
            "truthlens_analyze",
            Some(json!({ "content": "  \n " })),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, McpError::InvalidParameters { .. }));
        assert!(err.to_string().contains("Content cannot be empty"));
    }

    #[tokio::test]
    async fn test_recent_and_get_round_trip() {
        let state = offline_state();
        let first = state
            .analyze("Officials published the audit.", Language::En)
            .await
            .unwrap();
        first.persisted.await.unwrap();
        let second = state
            .analyze("SHOCKING miracle cure!", Language::En)
            .await
            .unwrap();
        second.persisted.await.unwrap();

        let value = handle_tool_call(&state, "truthlens_recent", None)
            .await
            .unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["analyses"][0]["content"], "SHOCKING miracle cure!");

        let value = handle_tool_call(&state, "truthlens_recent", Some(json!({ "limit": 1 })))
            .await
            .unwrap();
        assert_eq!(value["count"], 1);

        let id = value["analyses"][0]["id"].clone();
        let record = handle_tool_call(&state, "truthlens_get", Some(json!({ "id": id })))
            .await
            .unwrap();
        assert_eq!(record["content"], "SHOCKING miracle cure!");
        assert!(record.get("reliabilityScore").is_some());
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let state = offline_state();
        let err = handle_tool_call(&state, "truthlens_get", Some(json!({ "id": 404 })))
            .await
            .unwrap_err();

        assert!(matches!(err, McpError::ExecutionFailed { .. }));
        assert!(err.to_string().contains("not found: 404"));
    }

    #[tokio::test]
    async fn test_recent_rejects_zero_limit() {
        let state = offline_state();
        let err = handle_tool_call(&state, "truthlens_recent", Some(json!({ "limit": 0 })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }
}
