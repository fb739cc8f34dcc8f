//! Storage layer for analysis history.
//!
//! Every completed analysis is appended as an [`AnalysisRecord`]. Two
//! backends implement [`AnalysisStore`]: SQLite for durable history and a
//! process-local in-memory store.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::{AnalysisResult, Language};
use crate::config::{DatabaseConfig, StorageBackend};
use crate::error::StorageResult;

/// A persisted analysis: the input and the result produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Monotonic record identifier.
    pub id: i64,
    /// Analysed text as submitted (trimmed).
    pub content: String,
    /// Language the analysis ran in.
    pub language: Language,
    /// Scores, category and explanations.
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

/// Persistence operations for analysis history.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Append an analysis and return the stored record.
    async fn save(
        &self,
        content: &str,
        language: Language,
        result: &AnalysisResult,
    ) -> StorageResult<AnalysisRecord>;

    /// Most recent records first, at most `limit` of them.
    async fn recent(&self, limit: usize) -> StorageResult<Vec<AnalysisRecord>>;

    /// Look up a single record.
    async fn get(&self, id: i64) -> StorageResult<Option<AnalysisRecord>>;
}

/// Open the backend selected by the configuration.
pub async fn open(config: &DatabaseConfig) -> StorageResult<Arc<dyn AnalysisStore>> {
    Ok(match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStorage::new(config).await?),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    })
}

/// Fixed-width timestamp so text ordering matches time ordering.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
