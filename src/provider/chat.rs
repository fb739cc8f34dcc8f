use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    combined_messages, parse_completion, signal_messages, BiasPayload, CombinedPayload,
    FactualityPayload, SentimentPayload, Signal, SignalProvider,
};
use crate::analysis::Language;
use crate::config::{ChatConfig, RequestConfig};
use crate::error::{AnalysisError, AppError, AppResult, SignalResult};
use crate::langbase::Message;

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1000;

/// Provider for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Create a new chat completions provider
    pub fn new(config: &ChatConfig, request: &RequestConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request.timeout_ms))
            .build()
            .map_err(|e| AppError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, messages: Vec<Message>) -> SignalResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::unavailable(format!("HTTP error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::unavailable(format!(
                "API error: {} - {}",
                status.as_u16(),
                error_body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::malformed(format!("Failed to parse response: {}", e)))?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis(),
            "Chat completion succeeded"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AnalysisError::malformed("Completion had no content"))
    }
}

#[async_trait]
impl SignalProvider for ChatCompletionsProvider {
    fn name(&self) -> String {
        self.model.clone()
    }

    async fn combined(&self, content: &str, language: Language) -> SignalResult<CombinedPayload> {
        let completion = self.complete(combined_messages(content, language)).await?;
        parse_completion(&completion)
    }

    async fn sentiment(
        &self,
        content: &str,
        _language: Language,
    ) -> SignalResult<SentimentPayload> {
        let completion = self
            .complete(signal_messages(Signal::Sentiment, content))
            .await?;
        parse_completion(&completion)
    }

    async fn bias(&self, content: &str) -> SignalResult<f64> {
        let completion = self.complete(signal_messages(Signal::Bias, content)).await?;
        let payload: BiasPayload = parse_completion(&completion)?;
        debug!(indicators = payload.bias_indicators.len(), "Bias indicators reported");
        Ok(payload.bias_score)
    }

    async fn factuality(&self, content: &str) -> SignalResult<f64> {
        let completion = self
            .complete(signal_messages(Signal::Factuality, content))
            .await?;
        let payload: FactualityPayload = parse_completion(&completion)?;
        Ok(payload.factuality_score)
    }
}
