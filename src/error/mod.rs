use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Analysis record not found: {id}")]
    RecordNotFound { id: i64 },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("Langbase unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures of an analysis tier.
///
/// Everything except [`AnalysisError::EmptyInput`] is absorbed by the
/// degradation controller and never reaches the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    #[error("Malformed provider response: {message}")]
    MalformedResponse { message: String },

    /// `drift` is set when any member failed validation.
    #[error("Decomposed signals failed: {}", failed.join("; "))]
    PartialSignalFailure { failed: Vec<String>, drift: bool },

    #[error("Content cannot be empty")]
    EmptyInput,
}

impl AnalysisError {
    /// Shorthand for a [`AnalysisError::ProviderUnavailable`]
    pub fn unavailable(message: impl Into<String>) -> Self {
        AnalysisError::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a [`AnalysisError::MalformedResponse`]
    pub fn malformed(message: impl Into<String>) -> Self {
        AnalysisError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Collapse per-signal failures into one [`AnalysisError::PartialSignalFailure`]
    pub fn partial<L, I>(failures: I) -> Self
    where
        L: std::fmt::Display,
        I: IntoIterator<Item = (L, AnalysisError)>,
    {
        let mut drift = false;
        let failed = failures
            .into_iter()
            .map(|(signal, err)| {
                drift |= err.is_contract_drift();
                format!("{}: {}", signal, err)
            })
            .collect();
        AnalysisError::PartialSignalFailure { failed, drift }
    }

    /// Whether the error signals a shape drift with a collaborator rather
    /// than a transient outage.
    pub fn is_contract_drift(&self) -> bool {
        match self {
            AnalysisError::MalformedResponse { .. } => true,
            AnalysisError::PartialSignalFailure { drift, .. } => *drift,
            _ => false,
        }
    }
}

impl From<LangbaseError> for AnalysisError {
    fn from(err: LangbaseError) -> Self {
        match err {
            LangbaseError::InvalidResponse { message } => AnalysisError::MalformedResponse { message },
            other => AnalysisError::ProviderUnavailable {
                message: other.to_string(),
            },
        }
    }
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tool-specific errors with structured details
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        McpError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for provider signal calls
pub type SignalResult<T> = Result<T, AnalysisError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
