use async_trait::async_trait;
use tracing::debug;

use super::{
    combined_messages, parse_completion, signal_messages, BiasPayload, CombinedPayload,
    FactualityPayload, SentimentPayload, Signal, SignalProvider,
};
use crate::analysis::Language;
use crate::config::PipeConfig;
use crate::error::{AnalysisError, SignalResult};
use crate::langbase::{LangbaseClient, Message, PipeRequest};
use crate::prompts::{BIAS_PROMPT, COMBINED_ANALYSIS_PROMPT, FACTUALITY_PROMPT, SENTIMENT_PROMPT};

/// Provider backed by four Langbase pipes.
#[derive(Clone)]
pub struct LangbaseProvider {
    client: LangbaseClient,
    pipes: PipeConfig,
}

impl LangbaseProvider {
    /// Create a provider over an existing client
    pub fn new(client: LangbaseClient, pipes: PipeConfig) -> Self {
        Self { client, pipes }
    }

    async fn run(
        &self,
        pipe: &str,
        messages: Vec<Message>,
        language: Option<Language>,
    ) -> SignalResult<String> {
        let mut request = PipeRequest::new(pipe, messages);
        if let Some(language) = language {
            request = request.with_variable("language", language.as_str());
        }

        let response = self.client.call_pipe(request).await?;
        if !response.success {
            return Err(AnalysisError::unavailable(format!(
                "Pipe {} reported an unsuccessful run",
                pipe
            )));
        }

        debug!(pipe = %pipe, "Pipe completion received");
        Ok(response.completion)
    }
}

#[async_trait]
impl SignalProvider for LangbaseProvider {
    fn name(&self) -> String {
        "langbase".to_string()
    }

    async fn combined(&self, content: &str, language: Language) -> SignalResult<CombinedPayload> {
        let completion = self
            .run(
                &self.pipes.combined,
                combined_messages(content, language),
                Some(language),
            )
            .await?;
        parse_completion(&completion)
    }

    async fn sentiment(
        &self,
        content: &str,
        language: Language,
    ) -> SignalResult<SentimentPayload> {
        let completion = self
            .run(
                &self.pipes.sentiment,
                signal_messages(Signal::Sentiment, content),
                Some(language),
            )
            .await?;
        parse_completion(&completion)
    }

    async fn bias(&self, content: &str) -> SignalResult<f64> {
        let completion = self
            .run(&self.pipes.bias, signal_messages(Signal::Bias, content), None)
            .await?;
        let payload: BiasPayload = parse_completion(&completion)?;
        Ok(payload.bias_score)
    }

    async fn factuality(&self, content: &str) -> SignalResult<f64> {
        let completion = self
            .run(
                &self.pipes.factuality,
                signal_messages(Signal::Factuality, content),
                None,
            )
            .await?;
        let payload: FactualityPayload = parse_completion(&completion)?;
        Ok(payload.factuality_score)
    }

    /// Create or update every analysis pipe.
    async fn prepare(&self) -> SignalResult<()> {
        let pipes = [
            (
                &self.pipes.combined,
                "Combined trust analysis",
                COMBINED_ANALYSIS_PROMPT,
            ),
            (&self.pipes.sentiment, "Sentiment signal", SENTIMENT_PROMPT),
            (&self.pipes.bias, "Bias signal", BIAS_PROMPT),
            (
                &self.pipes.factuality,
                "Factuality signal",
                FACTUALITY_PROMPT,
            ),
        ];

        for (name, description, prompt) in pipes {
            self.client.ensure_pipe(name, description, prompt).await?;
        }
        Ok(())
    }
}
