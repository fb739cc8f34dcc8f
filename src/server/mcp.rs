//! MCP over stdio.
//!
//! One JSON-RPC 2.0 message per line on stdin, one response per line on
//! stdout. Logs go to stderr so they never interleave with responses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::{handle_tool_call, SharedState, MAX_RECENT_LIMIT};

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod mcp_tests;

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "mcp-truthlens";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

/// Incoming JSON-RPC message. A missing `id` marks a notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, expected to be "2.0".
    pub jsonrpc: String,
    /// Request id, echoed back in the response.
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outgoing JSON-RPC message. Exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed request id, `null` when it could not be determined.
    pub id: Value,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Standard JSON-RPC error code.
    pub code: i32,
    /// Description of the failure.
    pub message: String,
    /// Extra detail, unused by this server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Server identity sent during `initialize`.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Crate version.
    pub version: String,
}

/// Advertised capabilities.
#[derive(Debug, Serialize)]
pub struct Capabilities {
    /// Tool support.
    pub tools: ToolCapabilities,
}

/// Tool capability flags.
#[derive(Debug, Serialize)]
pub struct ToolCapabilities {
    /// The tool set is fixed for the server's lifetime.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Reply to `initialize`.
#[derive(Debug, Serialize)]
pub struct InitializeResult {
    /// Protocol revision.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Capabilities.
    pub capabilities: Capabilities,
    /// Identity.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// A tool as listed by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    /// Name used in `tools/call`.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON Schema of the arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/call` parameters.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Tool name.
    pub name: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One content block of a tool result.
#[derive(Debug, Serialize)]
pub struct ToolResultContent {
    /// Content kind; always "text" here.
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text itself.
    pub text: String,
}

/// Reply to `tools/call`.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    /// Content blocks.
    pub content: Vec<ToolResultContent>,
    /// Set only when the tool failed.
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallResult {
    fn text(text: String) -> Self {
        Self {
            content: vec![ToolResultContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            is_error: Some(true),
            ..Self::text(format!("Error: {}", message))
        }
    }
}

impl JsonRpcResponse {
    /// Successful response carrying `result`
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Error response with a JSON-RPC code
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    fn serialized(id: Option<Value>, payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self::success(id, value),
            Err(e) => {
                error!(error = %e, "Failed to serialize response payload");
                Self::error(id, INTERNAL_ERROR, format!("Internal error: {}", e))
            }
        }
    }
}

/// TruthLens MCP server.
pub struct McpServer {
    state: SharedState,
}

impl McpServer {
    /// Create a server over shared application state
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve stdin until EOF
    pub async fn run(&self) -> std::io::Result<()> {
        info!("TruthLens MCP server starting...");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.process_line(&line).await else {
                continue;
            };

            let encoded = serde_json::to_string(&response)?;
            debug!(response = %encoded, "Sending response");
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!("EOF received, shutting down");
        Ok(())
    }

    /// Decode and answer one input line. Blank lines and notifications
    /// produce nothing.
    async fn process_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!(request = %line, "Received request");

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "Unparseable request line");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        // Notifications never get a response, even for known methods
        if id.is_none() {
            debug!(method = %method, "Notification ignored");
            return None;
        }

        match method.as_str() {
            "initialize" => Some(JsonRpcResponse::serialized(id, initialize_result())),
            "tools/list" => Some(JsonRpcResponse::success(
                id,
                json!({ "tools": tool_definitions() }),
            )),
            "tools/call" => Some(self.call_tool(id, params).await),
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            _ => {
                warn!(method = %method, "Unknown method");
                Some(JsonRpcResponse::error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                ))
            }
        }
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params");
        };
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };

        info!(tool = %params.name, "Tool call");

        // Tool failures are reported in-band so the client can show them
        let result = match handle_tool_call(&self.state, &params.name, params.arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::failure(format!("Serialization failed: {}", e)),
            },
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                ToolCallResult::failure(e.to_string())
            }
        };

        JsonRpcResponse::serialized(id, result)
    }
}

fn initialize_result() -> InitializeResult {
    InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: Capabilities {
            tools: ToolCapabilities {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }
}

fn tool_definitions() -> Vec<Tool> {
    vec![get_analyze_tool(), get_recent_tool(), get_get_tool()]
}

fn get_analyze_tool() -> Tool {
    Tool {
        name: "truthlens_analyze".to_string(),
        description: "Assess a short passage for reliability, bias and sentiment. Returns scores, a category (reliable, questionable, misinformation), explanations and recommendations. Falls back to local pattern analysis when the remote provider is unavailable.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The text to analyze"
                },
                "language": {
                    "type": "string",
                    "enum": ["en", "ru"],
                    "default": "en",
                    "description": "Language of the content and of the explanations"
                }
            },
            "required": ["content"],
            "additionalProperties": false
        }),
    }
}

fn get_recent_tool() -> Tool {
    Tool {
        name: "truthlens_recent".to_string(),
        description: "List recently stored analyses, most recent first.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_RECENT_LIMIT,
                    "description": "Maximum number of analyses to return"
                }
            },
            "additionalProperties": false
        }),
    }
}

fn get_get_tool() -> Tool {
    Tool {
        name: "truthlens_get".to_string(),
        description: "Fetch one stored analysis by id.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "integer",
                    "description": "Analysis id as returned by truthlens_recent"
                }
            },
            "required": ["id"],
            "additionalProperties": false
        }),
    }
}
