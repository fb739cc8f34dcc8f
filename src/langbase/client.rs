use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::{PipeCreated, PipeDefinition, PipeRequest, PipeResponse};
use crate::config::{LangbaseConfig, RequestConfig};
use crate::error::{LangbaseError, LangbaseResult};

/// HTTP client for the Langbase Pipes API.
///
/// Transport failures and non-2xx statuses are retried up to
/// `max_retries` times with exponential backoff. A body that fails to
/// decode is returned at once.
#[derive(Clone)]
pub struct LangbaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl LangbaseClient {
    /// Build a client; the base URL loses any trailing slash
    pub fn new(config: &LangbaseConfig, request_config: RequestConfig) -> LangbaseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LangbaseError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// API root in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a pipe and return its completion
    pub async fn call_pipe(&self, request: PipeRequest) -> LangbaseResult<PipeResponse> {
        let url = format!("{}/v1/pipes/run", self.base_url);
        let max_retries = self.request_config.max_retries;
        let mut attempt = 0;

        loop {
            let start = Instant::now();
            debug!(pipe = %request.name, attempt, "Calling Langbase pipe");

            let err = match self.post_json::<_, PipeResponse>(&url, &request).await {
                Ok(response) => {
                    info!(
                        pipe = %request.name,
                        latency_ms = start.elapsed().as_millis(),
                        total_tokens = response.total_tokens(),
                        "Langbase pipe call succeeded"
                    );
                    return Ok(response);
                }
                Err(e @ LangbaseError::InvalidResponse { .. }) => return Err(e),
                Err(e) => e,
            };

            warn!(
                pipe = %request.name,
                error = %err,
                latency_ms = start.elapsed().as_millis(),
                attempt,
                "Langbase pipe call failed"
            );

            attempt += 1;
            if attempt > max_retries {
                return Err(LangbaseError::Unavailable {
                    message: err.to_string(),
                    retries: attempt,
                });
            }

            tokio::time::sleep(self.backoff(attempt)).await;
        }
    }

    /// Create or update a pipe. An already-existing pipe counts as success.
    pub async fn ensure_pipe(
        &self,
        pipe_name: &str,
        description: &str,
        system_prompt: &str,
    ) -> LangbaseResult<()> {
        let url = format!("{}/v1/pipes", self.base_url);
        let definition = PipeDefinition::json_analysis(pipe_name, description, system_prompt);

        match self.post_json::<_, PipeCreated>(&url, &definition).await {
            Ok(created) => {
                info!(pipe = %created.name, url = ?created.url, "Analysis pipe ready");
                Ok(())
            }
            Err(LangbaseError::Api { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                info!(pipe = %pipe_name, "Pipe already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(
            self.request_config
                .retry_delay_ms
                .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1))),
        )
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> LangbaseResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LangbaseError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    LangbaseError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LangbaseError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LangbaseError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }
}
