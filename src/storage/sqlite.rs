use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use super::{format_timestamp, AnalysisRecord, AnalysisStore};
use crate::analysis::{AnalysisDetails, AnalysisResult, Category, Language};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create an in-memory database (for tests)
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        // Each connection would get its own private database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AnalysisStore for SqliteStorage {
    async fn save(
        &self,
        content: &str,
        language: Language,
        result: &AnalysisResult,
    ) -> StorageResult<AnalysisRecord> {
        let analysis = serde_json::to_string(&result.analysis).map_err(|e| StorageError::Query {
            message: format!("Failed to encode analysis details: {}", e),
        })?;
        let created_at = Utc::now();

        let done = sqlx::query(
            r#"
            INSERT INTO analysis_requests
                (content, language, reliability_score, bias_score, sentiment_score, category, analysis, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(content)
        .bind(language.as_str())
        .bind(result.reliability_score)
        .bind(result.bias_score)
        .bind(result.sentiment_score)
        .bind(result.category.as_str())
        .bind(&analysis)
        .bind(format_timestamp(&created_at))
        .execute(&self.pool)
        .await?;

        Ok(AnalysisRecord {
            id: done.last_insert_rowid(),
            content: content.to_string(),
            language,
            result: result.clone(),
            created_at,
        })
    }

    async fn recent(&self, limit: usize) -> StorageResult<Vec<AnalysisRecord>> {
        let rows: Vec<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT id, content, language, reliability_score, bias_score, sentiment_score,
                   category, analysis, created_at
            FROM analysis_requests
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AnalysisRecord::try_from).collect()
    }

    async fn get(&self, id: i64) -> StorageResult<Option<AnalysisRecord>> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT id, content, language, reliability_score, bias_score, sentiment_score,
                   category, analysis, created_at
            FROM analysis_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AnalysisRecord::try_from).transpose()
    }
}

// Internal row type for SQLx mapping
#[derive(sqlx::FromRow)]
struct AnalysisRow {
    id: i64,
    content: String,
    language: String,
    reliability_score: f64,
    bias_score: f64,
    sentiment_score: f64,
    category: String,
    analysis: String,
    created_at: String,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = StorageError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let category: Category = row
            .category
            .parse()
            .map_err(|e: String| StorageError::Query { message: e })?;
        let analysis: AnalysisDetails =
            serde_json::from_str(&row.analysis).map_err(|e| StorageError::Query {
                message: format!("Corrupt analysis details for record {}: {}", row.id, e),
            })?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Query {
                message: format!("Corrupt created_at for record {}: {}", row.id, e),
            })?;

        Ok(Self {
            id: row.id,
            content: row.content,
            language: Language::from_tag(&row.language),
            result: AnalysisResult {
                reliability_score: row.reliability_score,
                bias_score: row.bias_score,
                sentiment_score: row.sentiment_score,
                category,
                analysis,
            },
            created_at,
        })
    }
}
