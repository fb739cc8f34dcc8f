use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model used when TruthLens provisions its own pipes.
pub const PIPE_MODEL: &str = "openai:gpt-4o-mini";
/// Sampling temperature for analysis pipes; low for stable scores.
pub const PIPE_TEMPERATURE: f64 = 0.3;
/// Completion budget for analysis pipes.
pub const PIPE_MAX_TOKENS: u32 = 1000;

/// Chat message, shared by the Langbase and chat-completions wire formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Author of a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Message {
    /// Instructions message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Input message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/pipes/run`
#[derive(Debug, Clone, Serialize)]
pub struct PipeRequest {
    pub name: String,
    pub messages: Vec<Message>,
    /// Always false; results are needed whole.
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
}

impl PipeRequest {
    /// Non-streaming run of `name` over `messages`
    pub fn new(name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            name: name.into(),
            messages,
            stream: false,
            variables: None,
        }
    }

    /// Attach a prompt variable
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Result of a pipe run
#[derive(Debug, Clone, Deserialize)]
pub struct PipeResponse {
    pub success: bool,
    pub completion: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub raw: Option<RawResponse>,
}

impl PipeResponse {
    /// Total tokens billed for the run, when reported
    pub fn total_tokens(&self) -> Option<u32> {
        self.raw
            .as_ref()
            .and_then(|raw| raw.usage.as_ref())
            .and_then(|usage| usage.total_tokens)
    }
}

/// Upstream model details
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Token accounting
#[derive(Debug, Clone, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Body of `POST /v1/pipes`, creating or updating a pipe
#[derive(Debug, Clone, Serialize)]
pub struct PipeDefinition {
    pub name: String,
    pub description: String,
    pub model: String,
    pub upsert: bool,
    /// Force the model into JSON output mode.
    pub json: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl PipeDefinition {
    /// JSON-mode analysis pipe driven by `system_prompt`, upserted so that
    /// prompt changes reach existing pipes
    pub fn json_analysis(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            model: PIPE_MODEL.to_string(),
            upsert: true,
            json: true,
            temperature: PIPE_TEMPERATURE,
            max_tokens: PIPE_MAX_TOKENS,
            messages: vec![Message::system(system_prompt)],
        }
    }
}

/// Reply to a pipe creation
#[derive(Debug, Clone, Deserialize)]
pub struct PipeCreated {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
