//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state and background persistence

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::analysis::{AnalysisResult, DegradationController, Language};
use crate::config::Config;
use crate::error::AnalysisError;
use crate::storage::AnalysisStore;

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Analysis history backend.
    pub store: Arc<dyn AnalysisStore>,
    /// Tiered analysis engine.
    pub controller: DegradationController,
}

/// An analysis result plus the handle of its pending history write.
pub struct CompletedAnalysis {
    /// The result returned to the caller.
    pub result: AnalysisResult,
    /// Background persistence task; dropping it leaves the write running.
    pub persisted: JoinHandle<()>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Config,
        store: Arc<dyn AnalysisStore>,
        controller: DegradationController,
    ) -> Self {
        tracing::info!(
            provider = %controller.provider_name(),
            tier_timeout_ms = config.analysis.tier_timeout_ms,
            "AppState initialized"
        );

        Self {
            config,
            store,
            controller,
        }
    }

    /// Analyze content and queue the result for persistence.
    ///
    /// The result is returned as soon as the controller finishes; the
    /// history write never delays or invalidates it.
    pub async fn analyze(
        &self,
        content: &str,
        language: Language,
    ) -> Result<CompletedAnalysis, AnalysisError> {
        let result = self.controller.analyze(content, language).await?;
        let persisted = persist_in_background(
            Arc::clone(&self.store),
            content.trim().to_string(),
            language,
            result.clone(),
        );
        Ok(CompletedAnalysis { result, persisted })
    }
}

/// Save a result on a detached task, logging failures instead of
/// returning them.
pub fn persist_in_background(
    store: Arc<dyn AnalysisStore>,
    content: String,
    language: Language,
    result: AnalysisResult,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.save(&content, language, &result).await {
            Ok(record) => debug!(id = record.id, "Analysis persisted"),
            Err(e) => warn!(error = %e, "Failed to persist analysis"),
        }
    })
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::analysis::HeuristicScorer;
    use crate::config::{
        AnalysisConfig, DatabaseConfig, LogFormat, LoggingConfig, PipeConfig, ProviderConfig,
        RequestConfig, StorageBackend,
    };
    use crate::provider::UnavailableProvider;
    use crate::storage::MemoryStorage;
    use std::path::PathBuf;

    pub fn create_test_config() -> Config {
        Config {
            provider: ProviderConfig::None,
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            request: RequestConfig::default(),
            pipes: PipeConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    /// State with no remote provider and an in-memory store
    pub fn offline_state() -> SharedState {
        let config = create_test_config();
        let controller = DegradationController::new(
            Arc::new(UnavailableProvider),
            HeuristicScorer::new(),
            config.analysis.clone(),
        );
        Arc::new(AppState::new(
            config,
            Arc::new(MemoryStorage::new()),
            controller,
        ))
    }
}
