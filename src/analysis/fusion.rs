//! Score fusion and category decisions.
//!
//! Decomposed provider signals (factuality, bias, sentiment) are combined
//! into one reliability score with fixed weights:
//!
//! ```text
//! reliability = round(clamp(f*0.5 + (100-b)*0.3 + max(0, 100-|s|)*0.2, 0, 100))
//! ```
//!
//! Two threshold sets exist. [`FUSION_THRESHOLDS`] applies to fused
//! signals and to category reconciliation; [`HEURISTIC_THRESHOLDS`] applies
//! to the pattern scorer, whose base scores are centred differently.

use std::time::Instant;

use super::patterns;
use super::{
    clamp_score, AnalysisDetails, AnalysisMetrics, AnalysisRequest, AnalysisResult, Category,
};

const FACTUALITY_WEIGHT: f64 = 0.5;
const NEUTRALITY_WEIGHT: f64 = 0.3;
const CALMNESS_WEIGHT: f64 = 0.2;

const CONFIDENCE_BASE: f64 = 50.0;
const CONFIDENCE_CAP: f64 = 95.0;

/// Upper or lower bound, strict or inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value >= limit` / `value <= limit`
    Inclusive(f64),
    /// `value > limit` / `value < limit`
    Exclusive(f64),
}

impl Bound {
    fn at_least(self, value: f64) -> bool {
        match self {
            Bound::Inclusive(limit) => value >= limit,
            Bound::Exclusive(limit) => value > limit,
        }
    }

    fn at_most(self, value: f64) -> bool {
        match self {
            Bound::Inclusive(limit) => value <= limit,
            Bound::Exclusive(limit) => value < limit,
        }
    }
}

/// Decision boundaries mapping reliability and bias to a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryThresholds {
    /// Reliable needs reliability at least this.
    pub reliable_min_reliability: Bound,
    /// Reliable needs bias at most this.
    pub reliable_max_bias: Bound,
    /// Misinformation when reliability is at most this.
    pub misinformation_max_reliability: Bound,
    /// Misinformation when bias is at least this.
    pub misinformation_min_bias: Bound,
}

/// Thresholds for fused provider signals.
pub const FUSION_THRESHOLDS: CategoryThresholds = CategoryThresholds {
    reliable_min_reliability: Bound::Inclusive(75.0),
    reliable_max_bias: Bound::Exclusive(40.0),
    misinformation_max_reliability: Bound::Inclusive(40.0),
    misinformation_min_bias: Bound::Exclusive(70.0),
};

/// Thresholds for the local pattern scorer.
pub const HEURISTIC_THRESHOLDS: CategoryThresholds = CategoryThresholds {
    reliable_min_reliability: Bound::Inclusive(70.0),
    reliable_max_bias: Bound::Inclusive(40.0),
    misinformation_max_reliability: Bound::Inclusive(30.0),
    misinformation_min_bias: Bound::Inclusive(70.0),
};

impl CategoryThresholds {
    /// Derive the category for a reliability/bias pair
    pub fn categorize(&self, reliability: f64, bias: f64) -> Category {
        if self.reliable_min_reliability.at_least(reliability)
            && self.reliable_max_bias.at_most(bias)
        {
            Category::Reliable
        } else if self.misinformation_max_reliability.at_most(reliability)
            || self.misinformation_min_bias.at_least(bias)
        {
            Category::Misinformation
        } else {
            Category::Questionable
        }
    }
}

/// Weighted reliability from decomposed signals, rounded to an integer.
pub fn fuse_reliability(metrics: &AnalysisMetrics) -> f64 {
    let calmness = (100.0 - metrics.sentiment_score.abs()).max(0.0);
    let raw = metrics.factuality_score * FACTUALITY_WEIGHT
        + (100.0 - metrics.bias_score) * NEUTRALITY_WEIGHT
        + calmness * CALMNESS_WEIGHT;
    clamp_score(raw).round()
}

/// Confidence grows when signals are decisive rather than middling.
pub fn fusion_confidence(metrics: &AnalysisMetrics) -> f64 {
    let mut confidence = CONFIDENCE_BASE;

    if metrics.factuality_score > 80.0 || metrics.factuality_score < 20.0 {
        confidence += 20.0;
    }
    if metrics.bias_score > 70.0 || metrics.bias_score < 20.0 {
        confidence += 15.0;
    }
    if metrics.sentiment_score.abs() > 70.0 {
        confidence += 10.0;
    }

    confidence.min(CONFIDENCE_CAP)
}

/// Build a complete result from decomposed signals.
///
/// `model` is the label recorded in the result; `started` marks the
/// beginning of the whole analysis so that processing time covers every
/// tier attempted.
pub fn fuse(
    request: &AnalysisRequest,
    metrics: &AnalysisMetrics,
    model: impl Into<String>,
    started: Instant,
) -> AnalysisResult {
    let pack = patterns::pack(request.language());
    let text = &pack.fusion;

    let reliability_score = fuse_reliability(metrics);
    let bias_score = metrics.bias_score;
    let sentiment_score = metrics.sentiment_score;
    let category = FUSION_THRESHOLDS.categorize(reliability_score, bias_score);

    let mut positive_points = Vec::new();
    let mut warning_points = Vec::new();

    if metrics.factuality_score > 70.0 {
        positive_points.push(text.high_factuality.to_string());
    }
    if bias_score < 30.0 {
        positive_points.push(text.low_bias.to_string());
    }
    if bias_score > 50.0 {
        warning_points.push(text.high_bias.to_string());
    }
    if sentiment_score.abs() > 60.0 {
        warning_points.push(text.strong_emotion.to_string());
    }
    if metrics.factuality_score < 50.0 {
        warning_points.push(text.low_factuality.to_string());
    }

    for indicator in pack.warning_hits(request.content()) {
        let explanation = indicator.explanation();
        if !warning_points.iter().any(|p| p == explanation) {
            warning_points.push(explanation.to_string());
        }
    }

    AnalysisResult {
        reliability_score,
        bias_score,
        sentiment_score,
        category,
        analysis: AnalysisDetails {
            positive_points,
            warning_points,
            recommendations: pack.recommendations(category),
            sources: None,
            confidence_level: fusion_confidence(metrics),
            processing_time: started.elapsed().as_secs_f64(),
            model: model.into(),
        },
    }
}
