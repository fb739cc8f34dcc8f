//! Command-line interface.
//!
//! `serve` runs the MCP server over stdio. `analyze` and `recent` are
//! one-shot commands that print JSON to stdout.

use clap::{Parser, Subcommand};

use crate::analysis::Language;
use crate::server::{resolve_limit, AppState};

/// TruthLens trust analysis.
#[derive(Parser, Debug)]
#[command(name = "mcp-truthlens", version, about)]
pub struct Cli {
    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the MCP server over stdio
    Serve,

    /// Analyze a piece of text and print the result
    Analyze {
        /// Text to analyze
        text: String,

        /// Content language: en or ru
        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Show recently stored analyses
    Recent {
        /// Maximum number of analyses to show
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Run `analyze`, waiting for the history write before returning.
pub async fn execute_analyze(state: &AppState, text: &str, language: &str) -> CliResult {
    let completed = match state.analyze(text, Language::from_tag(language)).await {
        Ok(c) => c,
        Err(e) => return CliResult::error(format!("Error: {}", e)),
    };

    // A one-shot process would exit before a detached write lands
    if let Err(e) = completed.persisted.await {
        tracing::warn!(error = %e, "Persistence task did not complete");
    }

    match serde_json::to_string_pretty(&completed.result) {
        Ok(json) => CliResult::success(json),
        Err(e) => CliResult::error(format!("Error: {}", e)),
    }
}

/// Run `recent`.
pub async fn execute_recent(state: &AppState, limit: Option<usize>) -> CliResult {
    let limit = match resolve_limit(limit, state.config.analysis.recent_default_limit) {
        Ok(n) => n,
        Err(e) => return CliResult::error(format!("Error: {}", e)),
    };

    match state.store.recent(limit).await {
        Ok(records) => match serde_json::to_string_pretty(&records) {
            Ok(json) => CliResult::success(json),
            Err(e) => CliResult::error(format!("Error: {}", e)),
        },
        Err(e) => CliResult::error(format!("Error: {}", e)),
    }
}
