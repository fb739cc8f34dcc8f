use std::time::Instant;
use tracing::debug;

use super::fusion::HEURISTIC_THRESHOLDS;
use super::patterns::{self, LanguagePack};
use super::{clamp_score, clamp_sentiment, AnalysisDetails, AnalysisRequest, AnalysisResult};

/// Model label reported by results from the local pattern scorer.
pub const HEURISTIC_MODEL: &str = "Advanced Pattern Analysis (Fallback)";

const BASE_RELIABILITY: i32 = 50;
const BASE_BIAS: i32 = 30;
const CONFIDENCE_BASE: f64 = 40.0;
const CONFIDENCE_PER_POINT: f64 = 10.0;
const CONFIDENCE_CAP: f64 = 85.0;

/// Local rule-based scorer; the last tier of the degradation chain.
///
/// Pure with respect to its input: no I/O, no shared state, and the same
/// request always yields the same scores and point lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    /// Create a new scorer
    pub fn new() -> Self {
        Self
    }

    /// Score a request with the pattern library for its language
    pub fn score(&self, request: &AnalysisRequest) -> AnalysisResult {
        self.score_since(request, Instant::now())
    }

    /// Score a request, measuring processing time from `started`
    pub fn score_since(&self, request: &AnalysisRequest, started: Instant) -> AnalysisResult {
        let pack = patterns::pack(request.language());
        let content = request.content();

        let mut reliability = BASE_RELIABILITY;
        let mut bias = BASE_BIAS;
        let mut sentiment = 0;
        let mut positive_points = Vec::new();
        let mut warning_points = Vec::new();

        for indicator in pack.reliability.iter().filter(|i| i.matches(content)) {
            reliability += indicator.weight();
            positive_points.push(indicator.explanation().to_string());
        }

        for indicator in pack.warning_hits(content) {
            bias += indicator.weight();
            warning_points.push(indicator.explanation().to_string());
        }

        for indicator in pack.emotional.iter().filter(|i| i.matches(content)) {
            sentiment += indicator.weight();
        }

        let reliability_score = clamp_score(f64::from(reliability));
        let bias_score = clamp_score(f64::from(bias));
        let sentiment_score = clamp_sentiment(f64::from(sentiment));

        let category = HEURISTIC_THRESHOLDS.categorize(reliability_score, bias_score);

        add_fillers(
            pack,
            content,
            bias_score,
            &mut positive_points,
            &mut warning_points,
        );

        let confidence_level = (CONFIDENCE_BASE
            + CONFIDENCE_PER_POINT * (positive_points.len() + warning_points.len()) as f64)
            .min(CONFIDENCE_CAP);

        debug!(
            reliability = reliability_score,
            bias = bias_score,
            sentiment = sentiment_score,
            category = %category,
            "Heuristic scoring completed"
        );

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
                confidence_level,
                processing_time: started.elapsed().as_secs_f64(),
                model: HEURISTIC_MODEL.to_string(),
            },
        }
    }
}

fn add_fillers(
    pack: &LanguagePack,
    content: &str,
    bias_score: f64,
    positive_points: &mut Vec<String>,
    warning_points: &mut Vec<String>,
) {
    if positive_points.is_empty() && !pack.alarming.is_match(content) {
        positive_points.push(pack.neutral_filler.to_string());
    }

    if warning_points.is_empty() && bias_score > f64::from(BASE_BIAS) {
        warning_points.push(pack.warning_filler.to_string());
    }
}
