//! Trust analysis core.
//!
//! This module turns a short passage of text into an [`AnalysisResult`]:
//! - [`patterns`]: weighted indicator library per language
//! - [`HeuristicScorer`]: local, infallible pattern scoring
//! - [`fusion`]: combination of decomposed provider signals
//! - [`DegradationController`]: combined → decomposed → heuristic tiers
//!
//! Every tier produces the same bounded result shape.

mod controller;
pub mod fusion;
mod heuristic;
pub mod patterns;

pub use controller::*;
pub use heuristic::*;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Lower bound of reliability, bias and confidence scores.
pub const SCORE_MIN: f64 = 0.0;
/// Upper bound of reliability, bias and confidence scores.
pub const SCORE_MAX: f64 = 100.0;
/// Bound of the signed sentiment score.
pub const SENTIMENT_LIMIT: f64 = 100.0;

/// Natural language of the analysed content.
///
/// Selects the pattern set and the language of explanation strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (primary).
    #[default]
    En,
    /// Russian (secondary).
    Ru,
}

impl Language {
    /// Get the language tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// Human-readable language name, used in provider prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Russian",
        }
    }

    /// Resolve a language tag, falling back to the primary language for
    /// anything unrecognised.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::En),
            "ru" | "rus" | "russian" => Ok(Language::Ru),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// Final tri-state verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Likely factual and well sourced.
    Reliable,
    /// Mixed signals; verify before trusting.
    Questionable,
    /// Strong manipulation or misinformation markers.
    Misinformation,
}

impl Category {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Reliable => "reliable",
            Category::Questionable => "questionable",
            Category::Misinformation => "misinformation",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reliable" => Ok(Category::Reliable),
            "questionable" => Ok(Category::Questionable),
            "misinformation" => Ok(Category::Misinformation),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A validated analysis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    content: String,
    language: Language,
}

impl AnalysisRequest {
    /// Create a request, trimming the content and rejecting blank input.
    pub fn new(content: impl AsRef<str>, language: Language) -> Result<Self, AnalysisError> {
        let trimmed = content.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        Ok(Self {
            content: trimmed.to_string(),
            language,
        })
    }

    /// The trimmed content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The content language
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Decomposed provider signals awaiting fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    /// Signed emotional tone, -100..=100.
    pub sentiment_score: f64,
    /// Manipulative or agenda-driven language, 0..=100.
    pub bias_score: f64,
    /// Factual grounding, 0..=100.
    pub factuality_score: f64,
}

impl AnalysisMetrics {
    /// Build metrics, clamping each signal into its declared range.
    pub fn new(sentiment_score: f64, bias_score: f64, factuality_score: f64) -> Self {
        Self {
            sentiment_score: clamp_sentiment(sentiment_score),
            bias_score: clamp_score(bias_score),
            factuality_score: clamp_score(factuality_score),
        }
    }
}

/// The trust assessment returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub reliability_score: f64,
    pub bias_score: f64,
    pub sentiment_score: f64,
    pub category: Category,
    pub analysis: AnalysisDetails,
}

/// Explanations and bookkeeping attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    pub positive_points: Vec<String>,
    pub warning_points: Vec<String>,
    pub recommendations: Vec<String>,
    /// Sources cited by a provider, when it reports any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    pub confidence_level: f64,
    /// Seconds spent producing the result.
    pub processing_time: f64,
    /// Which tier produced the result.
    pub model: String,
}

impl AnalysisResult {
    /// Check every numeric field against its declared bound and that
    /// recommendations are present.
    pub fn is_within_bounds(&self) -> bool {
        in_range(self.reliability_score, SCORE_MIN, SCORE_MAX)
            && in_range(self.bias_score, SCORE_MIN, SCORE_MAX)
            && in_range(self.sentiment_score, -SENTIMENT_LIMIT, SENTIMENT_LIMIT)
            && in_range(self.analysis.confidence_level, SCORE_MIN, SCORE_MAX)
            && self.analysis.processing_time.is_finite()
            && self.analysis.processing_time >= 0.0
            && !self.analysis.recommendations.is_empty()
    }
}

pub(crate) fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

pub(crate) fn clamp_sentiment(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-SENTIMENT_LIMIT, SENTIMENT_LIMIT)
}
