use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::fusion::{fuse, FUSION_THRESHOLDS};
use super::patterns;
use super::{
    AnalysisDetails, AnalysisMetrics, AnalysisRequest, AnalysisResult, HeuristicScorer, Language,
};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, SignalResult};
use crate::provider::{check_range, Signal, SignalProvider};

/// Model label for a result taken from the combined tier
pub fn combined_model_label(provider: &str) -> String {
    format!("Combined LLM Analysis ({})", provider)
}

/// Model label for a result fused from decomposed signals
pub fn decomposed_model_label(provider: &str) -> String {
    format!("Decomposed Signal Fusion ({})", provider)
}

/// Runs the three analysis tiers in order and returns the first success.
///
/// ```text
/// combined ──fail──► decomposed ──fail──► heuristic
/// ```
///
/// Only [`AnalysisError::EmptyInput`] ever reaches the caller; every
/// provider failure is logged and absorbed.
pub struct DegradationController {
    provider: Arc<dyn SignalProvider>,
    heuristic: HeuristicScorer,
    config: AnalysisConfig,
}

impl DegradationController {
    /// Create a controller over a provider and a local scorer
    pub fn new(
        provider: Arc<dyn SignalProvider>,
        heuristic: HeuristicScorer,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            provider,
            heuristic,
            config,
        }
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> String {
        self.provider.name()
    }

    /// Analyze content, degrading through the tiers as needed.
    pub async fn analyze(
        &self,
        content: &str,
        language: Language,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let request = AnalysisRequest::new(content, language)?;

        let span = info_span!(
            "analysis",
            request_id = %Uuid::new_v4(),
            language = %language,
        );
        Ok(self.run_tiers(&request, started).instrument(span).await)
    }

    async fn run_tiers(&self, request: &AnalysisRequest, started: Instant) -> AnalysisResult {
        let provider = self.provider.name();
        debug!(provider = %provider, chars = request.content().len(), "Starting analysis");

        match self.combined_tier(request, &provider, started).await {
            Ok(result) => {
                log_success("combined", &result);
                return result;
            }
            Err(e) => log_tier_failure("combined", &e),
        }

        match self.decomposed_tier(request, &provider, started).await {
            Ok(result) => {
                log_success("decomposed", &result);
                return result;
            }
            Err(e) => log_tier_failure("decomposed", &e),
        }

        let result = self.heuristic.score_since(request, started);
        log_success("heuristic", &result);
        result
    }

    async fn combined_tier(
        &self,
        request: &AnalysisRequest,
        provider: &str,
        started: Instant,
    ) -> SignalResult<AnalysisResult> {
        let payload = self
            .within_tier_timeout(
                "combined",
                self.provider.combined(request.content(), request.language()),
            )
            .await?;

        let reported = payload.validate()?;
        let derived = FUSION_THRESHOLDS.categorize(payload.reliability_score, payload.bias_score);
        if derived != reported {
            warn!(
                reported = %reported,
                derived = %derived,
                reconciled = self.config.reconcile_provider_category,
                "Provider category disagrees with score thresholds"
            );
        }
        let category = if self.config.reconcile_provider_category {
            derived
        } else {
            reported
        };

        let recommendations = if payload.recommendations.is_empty() {
            patterns::pack(request.language()).recommendations(category)
        } else {
            payload.recommendations
        };

        Ok(AnalysisResult {
            reliability_score: payload.reliability_score,
            bias_score: payload.bias_score,
            sentiment_score: payload.sentiment_score,
            category,
            analysis: AnalysisDetails {
                positive_points: payload.positive_points,
                warning_points: payload.warning_points,
                recommendations,
                sources: payload.sources.filter(|s| !s.is_empty()),
                confidence_level: payload.confidence_level,
                processing_time: started.elapsed().as_secs_f64(),
                model: combined_model_label(provider),
            },
        })
    }

    async fn decomposed_tier(
        &self,
        request: &AnalysisRequest,
        provider: &str,
        started: Instant,
    ) -> SignalResult<AnalysisResult> {
        let content = request.content();
        let (sentiment, bias, factuality) = self
            .within_tier_timeout("decomposed", async {
                Ok(tokio::join!(
                    self.provider.sentiment(content, request.language()),
                    self.provider.bias(content),
                    self.provider.factuality(content),
                ))
            })
            .await?;

        let sentiment = sentiment.and_then(|p| p.signed_score());
        let bias = bias.and_then(|b| check_range("bias_score", b, 0.0, 100.0));
        let factuality = factuality.and_then(|f| check_range("factuality_score", f, 0.0, 100.0));

        match (sentiment, bias, factuality) {
            (Ok(sentiment), Ok(bias), Ok(factuality)) => {
                let metrics = AnalysisMetrics::new(sentiment, bias, factuality);
                debug!(
                    sentiment = metrics.sentiment_score,
                    bias = metrics.bias_score,
                    factuality = metrics.factuality_score,
                    "Decomposed signals received"
                );
                Ok(fuse(
                    request,
                    &metrics,
                    decomposed_model_label(provider),
                    started,
                ))
            }
            (sentiment, bias, factuality) => {
                let failed = [
                    (Signal::Sentiment, sentiment.err()),
                    (Signal::Bias, bias.err()),
                    (Signal::Factuality, factuality.err()),
                ]
                .into_iter()
                .filter_map(|(signal, err)| err.map(|e| (signal, e)));

                Err(AnalysisError::partial(failed))
            }
        }
    }

    async fn within_tier_timeout<T, F>(&self, tier: &str, fut: F) -> SignalResult<T>
    where
        F: Future<Output = SignalResult<T>>,
    {
        let limit = Duration::from_millis(self.config.tier_timeout_ms);
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::unavailable(format!(
                "{} tier timed out after {}ms",
                tier, self.config.tier_timeout_ms
            ))),
        }
    }
}

fn log_success(tier: &str, result: &AnalysisResult) {
    info!(
        tier,
        model = %result.analysis.model,
        category = %result.category,
        reliability = result.reliability_score,
        processing_time = result.analysis.processing_time,
        "Analysis completed"
    );
}

fn log_tier_failure(tier: &str, err: &AnalysisError) {
    if err.is_contract_drift() {
        warn!(
            tier,
            error = %err,
            contract_drift = true,
            "Provider response failed validation, degrading"
        );
    } else {
        warn!(tier, error = %err, "Analysis tier unavailable, degrading");
    }
}
