use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{AnalysisRecord, AnalysisStore};
use crate::analysis::{AnalysisResult, Language};
use crate::error::{StorageError, StorageResult};

/// Process-local store; history is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, AnalysisRecord>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::Query {
            message: "Memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl AnalysisStore for MemoryStorage {
    async fn save(
        &self,
        content: &str,
        language: Language,
        result: &AnalysisResult,
    ) -> StorageResult<AnalysisRecord> {
        let mut inner = self.lock()?;
        inner.next_id += 1;

        let record = AnalysisRecord {
            id: inner.next_id,
            content: content.to_string(),
            language,
            result: result.clone(),
            created_at: Utc::now(),
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> StorageResult<Vec<AnalysisRecord>> {
        let inner = self.lock()?;
        // Ids grow with insertion time, so key order is creation order
        Ok(inner.records.values().rev().take(limit).cloned().collect())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<AnalysisRecord>> {
        let inner = self.lock()?;
        Ok(inner.records.get(&id).cloned())
    }
}
