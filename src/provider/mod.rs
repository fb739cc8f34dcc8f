//! Remote analysis providers.
//!
//! A [`SignalProvider`] answers either one combined question ("assess this
//! text") or three decomposed ones (sentiment, bias, factuality). Providers
//! only speak the JSON contract defined in [`crate::prompts`]; validation
//! of the payloads happens here so every backend fails the same way.

mod chat;
mod langbase;

pub use chat::ChatCompletionsProvider;
pub use langbase::LangbaseProvider;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::analysis::{in_range, Category, Language, SCORE_MAX, SCORE_MIN, SENTIMENT_LIMIT};
use crate::config::{Config, ProviderConfig};
use crate::error::{AnalysisError, AppResult, SignalResult};
use crate::langbase::{LangbaseClient, Message};
use crate::prompts::{
    combined_user_message, BIAS_PROMPT, COMBINED_ANALYSIS_PROMPT, FACTUALITY_PROMPT,
    SENTIMENT_PROMPT,
};

/// Capability contract of a remote analysis backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Short provider name recorded in result model labels.
    fn name(&self) -> String;

    /// One-shot assessment returning a complete, unvalidated payload.
    async fn combined(&self, content: &str, language: Language) -> SignalResult<CombinedPayload>;

    /// Sentiment label with a 0..=1 confidence.
    async fn sentiment(&self, content: &str, language: Language)
        -> SignalResult<SentimentPayload>;

    /// Bias score in 0..=100.
    async fn bias(&self, content: &str) -> SignalResult<f64>;

    /// Factuality score in 0..=100.
    async fn factuality(&self, content: &str) -> SignalResult<f64>;

    /// One-time setup before serving (e.g. creating remote pipes).
    async fn prepare(&self) -> SignalResult<()> {
        Ok(())
    }
}

/// The three decomposed signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Emotional tone.
    Sentiment,
    /// Manipulative or agenda-driven language.
    Bias,
    /// Factual grounding.
    Factuality,
}

impl Signal {
    /// Get the signal name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Sentiment => "sentiment",
            Signal::Bias => "bias",
            Signal::Factuality => "factuality",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            Signal::Sentiment => SENTIMENT_PROMPT,
            Signal::Bias => BIAS_PROMPT,
            Signal::Factuality => FACTUALITY_PROMPT,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Signal::Sentiment => "Analyze sentiment",
            Signal::Bias => "Analyze bias",
            Signal::Factuality => "Rate factuality",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Combined-tier payload as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPayload {
    pub reliability_score: f64,
    pub bias_score: f64,
    pub sentiment_score: f64,
    pub category: String,
    #[serde(default)]
    pub positive_points: Vec<String>,
    #[serde(default)]
    pub warning_points: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    pub confidence_level: f64,
}

impl CombinedPayload {
    /// Check every numeric field against its bound and resolve the category.
    pub fn validate(&self) -> SignalResult<Category> {
        check_range("reliability_score", self.reliability_score, SCORE_MIN, SCORE_MAX)?;
        check_range("bias_score", self.bias_score, SCORE_MIN, SCORE_MAX)?;
        check_range(
            "sentiment_score",
            self.sentiment_score,
            -SENTIMENT_LIMIT,
            SENTIMENT_LIMIT,
        )?;
        check_range("confidence_level", self.confidence_level, SCORE_MIN, SCORE_MAX)?;

        self.category
            .parse()
            .map_err(AnalysisError::malformed)
    }
}

/// Sentiment classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPayload {
    pub label: String,
    pub score: f64,
}

impl SentimentPayload {
    /// Map to a signed -100..=100 score.
    ///
    /// Scaled by 100; only a negative label flips the sign.
    pub fn signed_score(&self) -> SignalResult<f64> {
        check_range("sentiment score", self.score, 0.0, 1.0)?;

        match self.label.trim().to_lowercase().as_str() {
            "positive" | "neutral" => Ok(self.score * 100.0),
            "negative" => Ok(-self.score * 100.0),
            other => Err(AnalysisError::malformed(format!(
                "Unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// Bias classification.
#[derive(Debug, Clone, Deserialize)]
pub struct BiasPayload {
    pub bias_score: f64,
    #[serde(default)]
    pub bias_indicators: Vec<String>,
}

/// Factuality classification.
#[derive(Debug, Clone, Deserialize)]
pub struct FactualityPayload {
    pub factuality_score: f64,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Fail with `MalformedResponse` unless `value` is finite and within bounds.
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> SignalResult<f64> {
    if in_range(value, min, max) {
        Ok(value)
    } else {
        Err(AnalysisError::malformed(format!(
            "{} out of range [{}, {}]: {}",
            field, min, max, value
        )))
    }
}

/// Extract JSON from a completion, handling markdown code blocks.
pub(crate) fn extract_json_from_completion(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty".to_string());
    }

    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty".to_string());
    }

    Err(format!(
        "No JSON found in response. First 100 chars: '{}'",
        completion.chars().take(100).collect::<String>()
    ))
}

/// Parse a completion into a payload type.
pub(crate) fn parse_completion<T: DeserializeOwned>(completion: &str) -> SignalResult<T> {
    let json = extract_json_from_completion(completion).map_err(AnalysisError::malformed)?;
    serde_json::from_str(json)
        .map_err(|e| AnalysisError::malformed(format!("Failed to parse payload: {}", e)))
}

pub(crate) fn combined_messages(content: &str, language: Language) -> Vec<Message> {
    vec![
        Message::system(COMBINED_ANALYSIS_PROMPT),
        Message::user(combined_user_message(content, language.display_name())),
    ]
}

pub(crate) fn signal_messages(signal: Signal, content: &str) -> Vec<Message> {
    vec![
        Message::system(signal.prompt()),
        Message::user(format!("{}: \"{}\"", signal.instruction(), content)),
    ]
}

/// Provider used when no remote backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

#[async_trait]
impl SignalProvider for UnavailableProvider {
    fn name(&self) -> String {
        "none".to_string()
    }

    async fn combined(&self, _content: &str, _language: Language) -> SignalResult<CombinedPayload> {
        Err(not_configured())
    }

    async fn sentiment(
        &self,
        _content: &str,
        _language: Language,
    ) -> SignalResult<SentimentPayload> {
        Err(not_configured())
    }

    async fn bias(&self, _content: &str) -> SignalResult<f64> {
        Err(not_configured())
    }

    async fn factuality(&self, _content: &str) -> SignalResult<f64> {
        Err(not_configured())
    }
}

fn not_configured() -> AnalysisError {
    AnalysisError::unavailable("No analysis provider configured")
}

/// Build the provider selected by the configuration.
pub fn from_config(config: &Config) -> AppResult<Arc<dyn SignalProvider>> {
    let provider: Arc<dyn SignalProvider> = match &config.provider {
        ProviderConfig::Langbase(langbase) => {
            let client = LangbaseClient::new(langbase, config.request.clone())?;
            Arc::new(LangbaseProvider::new(client, config.pipes.clone()))
        }
        ProviderConfig::Chat(chat) => {
            Arc::new(ChatCompletionsProvider::new(chat, &config.request)?)
        }
        ProviderConfig::None => Arc::new(UnavailableProvider),
    };

    info!(provider = %provider.name(), "Analysis provider selected");
    Ok(provider)
}
