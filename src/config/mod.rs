use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
    pub analysis: AnalysisConfig,
}

/// Which remote analysis provider backs the external tiers
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// Langbase pipes
    Langbase(LangbaseConfig),
    /// OpenAI-compatible chat completions endpoint
    Chat(ChatConfig),
    /// No remote provider; every request is scored locally
    None,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Chat completions API configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Langbase pipe name configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    pub combined: String,
    pub sentiment: String,
    pub bias: String,
    pub factuality: String,
}

/// Degradation and scoring behaviour
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Upper bound on a single external tier
    pub tier_timeout_ms: u64,
    /// Re-derive the combined tier's category from the fusion thresholds
    pub reconcile_provider_category: bool,
    /// Default `limit` for recent-analysis queries
    pub recent_default_limit: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let provider = provider_from_env()?;

        let database = DatabaseConfig {
            backend: match env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "sqlite".to_string())
                .to_lowercase()
                .as_str()
            {
                "memory" => StorageBackend::Memory,
                _ => StorageBackend::Sqlite,
            },
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/truthlens.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 30000),
            max_retries: parse_env("MAX_RETRIES", 0),
            retry_delay_ms: parse_env("RETRY_DELAY_MS", 1000),
        };

        let defaults = PipeConfig::default();
        let pipes = PipeConfig {
            combined: env::var("PIPE_COMBINED").unwrap_or(defaults.combined),
            sentiment: env::var("PIPE_SENTIMENT").unwrap_or(defaults.sentiment),
            bias: env::var("PIPE_BIAS").unwrap_or(defaults.bias),
            factuality: env::var("PIPE_FACTUALITY").unwrap_or(defaults.factuality),
        };

        let analysis = AnalysisConfig {
            tier_timeout_ms: parse_env("TIER_TIMEOUT_MS", 15000),
            reconcile_provider_category: env::var("RECONCILE_PROVIDER_CATEGORY")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            recent_default_limit: parse_env("RECENT_DEFAULT_LIMIT", 10),
        };

        Ok(Config {
            provider,
            database,
            logging,
            request,
            pipes,
            analysis,
        })
    }
}

fn provider_from_env() -> Result<ProviderConfig, AppError> {
    let langbase_key = env::var("LANGBASE_API_KEY").ok().filter(|k| !k.is_empty());
    let selected = env::var("ANALYSIS_PROVIDER").unwrap_or_else(|_| {
        if langbase_key.is_some() {
            "langbase".to_string()
        } else {
            "none".to_string()
        }
    });

    match selected.to_lowercase().as_str() {
        "langbase" => Ok(ProviderConfig::Langbase(LangbaseConfig {
            api_key: langbase_key.ok_or_else(|| AppError::Config {
                message: "LANGBASE_API_KEY is required when ANALYSIS_PROVIDER=langbase"
                    .to_string(),
            })?,
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        })),
        "chat" => Ok(ProviderConfig::Chat(ChatConfig {
            api_key: env::var("CHAT_API_KEY").map_err(|_| AppError::Config {
                message: "CHAT_API_KEY is required when ANALYSIS_PROVIDER=chat".to_string(),
            })?,
            base_url: env::var("CHAT_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com".to_string()),
            model: env::var("CHAT_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string()),
        })),
        "none" => Ok(ProviderConfig::None),
        other => Err(AppError::Config {
            message: format!(
                "Unknown ANALYSIS_PROVIDER '{}' (expected langbase, chat or none)",
                other
            ),
        }),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl ProviderConfig {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Langbase(_) => "langbase",
            ProviderConfig::Chat(_) => "chat",
            ProviderConfig::None => "none",
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            combined: "truthlens-combined-v1".to_string(),
            sentiment: "truthlens-sentiment-v1".to_string(),
            bias: "truthlens-bias-v1".to_string(),
            factuality: "truthlens-factuality-v1".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tier_timeout_ms: 15000,
            reconcile_provider_category: false,
            recent_default_limit: 10,
        }
    }
}
